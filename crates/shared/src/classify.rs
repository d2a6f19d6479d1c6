use crate::domain::MarketerType;

/// Maps the two aggregate meeting scores to a marketer type.
///
/// The four branches are evaluated as ordered independent predicates, the
/// meeting-two threshold is `>= 4` (of max 7) and the meeting-three
/// threshold is `>= 2` (of max 3). A missing score always falls through to
/// `Curious`, whatever the other score says.
pub fn classify(meeting_two: Option<i64>, meeting_three: Option<i64>) -> MarketerType {
    if let (Some(two), Some(three)) = (meeting_two, meeting_three) {
        if two >= 4 && three < 2 {
            return MarketerType::DataAware;
        }
        if two < 4 && three >= 2 {
            return MarketerType::Creative;
        }
        if two >= 4 && three >= 2 {
            return MarketerType::AllAround;
        }
    }
    MarketerType::Curious
}
