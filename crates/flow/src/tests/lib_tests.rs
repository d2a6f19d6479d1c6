use super::*;

fn advance(controller: &mut FlowController, event: FlowEvent<'_>) -> Scene {
    match controller.transition(event).expect("transition") {
        Step::Moved { scene, .. } => scene,
        Step::WrongAnswer { .. } => panic!("unexpected wrong-answer outcome"),
    }
}

/// Walks a fresh controller up to the first meeting-two question.
fn controller_at_m2q1() -> FlowController {
    let mut c = FlowController::new();
    advance(&mut c, FlowEvent::Next);
    advance(
        &mut c,
        FlowEvent::SubmitProfile {
            name: "Sinta",
            email: "sinta@example.com",
        },
    );
    advance(&mut c, FlowEvent::Next); // chat -> meeting cover
    advance(&mut c, FlowEvent::Next); // cover -> m1q1
    advance(&mut c, FlowEvent::SubmitChoice("instagram"));
    advance(&mut c, FlowEvent::SubmitChoice("search-ads"));
    advance(&mut c, FlowEvent::SubmitPair("headline", "description"));
    advance(&mut c, FlowEvent::Next); // transition popup
    advance(&mut c, FlowEvent::Next); // meeting 2 cover
    assert_eq!(c.scene(), Scene::M2Q1);
    c
}

#[test]
fn starts_at_welcome_and_registration_captures_profile() {
    let mut c = FlowController::new();
    assert_eq!(c.scene(), Scene::Welcome);
    advance(&mut c, FlowEvent::Next);
    assert_eq!(c.scene(), Scene::Registration);
    advance(
        &mut c,
        FlowEvent::SubmitProfile {
            name: "Sinta",
            email: "sinta@example.com",
        },
    );
    assert_eq!(c.scene(), Scene::Chat);
    assert_eq!(c.profile().name, "Sinta");
    assert_eq!(c.profile().email, "sinta@example.com");
}

#[test]
fn back_follows_strict_predecessors() {
    let mut c = controller_at_m2q1();
    assert_eq!(advance(&mut c, FlowEvent::Back), Scene::Meeting2Cover);
    assert_eq!(advance(&mut c, FlowEvent::Back), Scene::M1Q3);
    assert_eq!(advance(&mut c, FlowEvent::Back), Scene::M1Q2);
}

#[test]
fn welcome_and_popups_have_no_back() {
    let mut c = FlowController::new();
    assert_eq!(
        c.transition(FlowEvent::Back),
        Err(FlowError::NoBack(Scene::Welcome))
    );
    assert_eq!(Scene::MeetingTransition.back(), None);
    assert_eq!(Scene::M2ToM3Transition.back(), None);
    assert_eq!(Scene::Closing.back(), None);
}

#[test]
fn wrong_choice_never_advances_and_rearms() {
    let mut c = FlowController::new();
    advance(&mut c, FlowEvent::Next);
    advance(
        &mut c,
        FlowEvent::SubmitProfile {
            name: "Sinta",
            email: "s@example.com",
        },
    );
    advance(&mut c, FlowEvent::Next);
    advance(&mut c, FlowEvent::Next);
    assert_eq!(c.scene(), Scene::M1Q1);

    for wrong in ["facebook", "tiktok", "linkedin"] {
        let step = c.transition(FlowEvent::SubmitChoice(wrong)).expect("step");
        assert_eq!(
            step,
            Step::WrongAnswer {
                popup: WRONG_ANSWER_POPUP
            }
        );
        assert_eq!(c.scene(), Scene::M1Q1);
    }

    // After the popup closes the scene accepts a fresh submission.
    assert_eq!(
        advance(&mut c, FlowEvent::SubmitChoice("instagram")),
        Scene::M1Q2
    );
}

#[test]
fn drag_and_drop_pair_is_order_insensitive() {
    let mut c = FlowController::new();
    advance(&mut c, FlowEvent::Next);
    advance(
        &mut c,
        FlowEvent::SubmitProfile {
            name: "Sinta",
            email: "s@example.com",
        },
    );
    advance(&mut c, FlowEvent::Next);
    advance(&mut c, FlowEvent::Next);
    advance(&mut c, FlowEvent::SubmitChoice("instagram"));
    advance(&mut c, FlowEvent::SubmitChoice("search-ads"));
    assert_eq!(c.scene(), Scene::M1Q3);

    let step = c
        .transition(FlowEvent::SubmitPair("headline", "image"))
        .expect("step");
    assert!(matches!(step, Step::WrongAnswer { .. }));
    assert_eq!(c.scene(), Scene::M1Q3);

    // Reversed order of the correct pair still passes.
    assert_eq!(
        advance(&mut c, FlowEvent::SubmitPair("description", "headline")),
        Scene::MeetingTransition
    );
}

#[test]
fn all_correct_meeting_two_answers_accumulate_to_seven() {
    let mut c = controller_at_m2q1();
    for answer in ["750000", "500000", "promo-b-smallest", "time-3", "4", "B", "C"] {
        advance(&mut c, FlowEvent::SubmitScored(answer));
    }
    assert_eq!(c.scene(), Scene::M2ToM3Transition);
    assert_eq!(c.meeting_two_score(), 7);
}

#[test]
fn each_wrong_answer_costs_exactly_one_point() {
    let correct = ["750000", "500000", "promo-b-smallest", "time-3", "4", "B", "C"];
    for miss in 0..correct.len() {
        let mut c = controller_at_m2q1();
        for (i, answer) in correct.iter().enumerate() {
            let submitted = if i == miss { "wrong" } else { answer };
            advance(&mut c, FlowEvent::SubmitScored(submitted));
        }
        assert_eq!(c.meeting_two_score(), 6, "missed question {miss}");
    }
}

#[test]
fn wrong_scored_answers_still_advance() {
    let mut c = controller_at_m2q1();
    for _ in 0..7 {
        let step = c.transition(FlowEvent::SubmitScored("nope")).expect("step");
        assert!(matches!(step, Step::Moved { .. }));
    }
    assert_eq!(c.scene(), Scene::M2ToM3Transition);
    assert_eq!(c.meeting_two_score(), 0);
}

#[test]
fn calculator_answers_match_after_normalization() {
    let mut c = controller_at_m2q1();
    advance(&mut c, FlowEvent::SubmitScored("750000.00"));
    assert_eq!(c.meeting_two_score(), 1);
    advance(&mut c, FlowEvent::SubmitScored(" 500000.0 "));
    assert_eq!(c.meeting_two_score(), 2);
}

#[test]
fn leaving_meeting_two_persists_the_total() {
    let mut c = controller_at_m2q1();
    for answer in ["750000", "wrong", "promo-b-smallest", "time-3", "wrong", "B", "C"] {
        advance(&mut c, FlowEvent::SubmitScored(answer));
    }
    assert_eq!(c.meeting_two_score(), 5);

    let step = c.transition(FlowEvent::Next).expect("step");
    let Step::Moved { scene, effects } = step else {
        panic!("expected a move");
    };
    assert_eq!(scene, Scene::Meeting3Cover);
    assert_eq!(effects, vec![Effect::PersistMeetingTwoScore(5)]);
}

#[test]
fn essays_gate_on_non_empty_trimmed_text() {
    let mut c = controller_at_m2q1();
    for _ in 0..7 {
        advance(&mut c, FlowEvent::SubmitScored("x"));
    }
    advance(&mut c, FlowEvent::Next); // persist + meeting 3 cover
    advance(&mut c, FlowEvent::Next); // m3q1
    advance(&mut c, FlowEvent::Next); // m3q2

    assert_eq!(
        c.transition(FlowEvent::SubmitText("   ")),
        Err(FlowError::EmptyAnswer)
    );
    assert_eq!(c.scene(), Scene::M3Q2);

    let step = c
        .transition(FlowEvent::SubmitText("Saya akan fokus pada data."))
        .expect("step");
    let Step::Moved { scene, effects } = step else {
        panic!("expected a move");
    };
    assert_eq!(scene, Scene::M3Q3);
    assert_eq!(
        effects,
        vec![Effect::GradeAndPersistEssay(
            "Saya akan fokus pada data.".to_string()
        )]
    );
}

#[test]
fn closing_resolves_result_and_clears_session() {
    let mut c = controller_at_m2q1();
    for _ in 0..7 {
        advance(&mut c, FlowEvent::SubmitScored("x"));
    }
    advance(&mut c, FlowEvent::Next);
    advance(&mut c, FlowEvent::Next);
    advance(&mut c, FlowEvent::Next);
    advance(&mut c, FlowEvent::SubmitText("essay"));

    let step = c
        .transition(FlowEvent::SubmitText("motivasi saya"))
        .expect("step");
    let Step::Moved { scene, effects } = step else {
        panic!("expected a move");
    };
    assert_eq!(scene, Scene::Closing);
    assert_eq!(
        effects,
        vec![
            Effect::PersistMotivation("motivasi saya".to_string()),
            Effect::ResolveResult,
            Effect::ClearSession,
        ]
    );

    assert_eq!(c.transition(FlowEvent::Next), Err(FlowError::FlowComplete));
}

#[test]
fn cookie_resume_lands_on_chat() {
    let c = FlowController::resume(
        Some(shared::domain::SessionIdentity {
            name: "Sinta".into(),
            email: "sinta@example.com".into(),
        }),
        &EntryQuery::default(),
    );
    assert_eq!(c.scene(), Scene::Chat);
    assert_eq!(c.profile().name, "Sinta");
}

#[test]
fn deep_link_resume_lands_on_meeting_cover() {
    let c = FlowController::resume(
        None,
        &EntryQuery {
            scene: Some("meeting-cover".into()),
            name: Some("Sinta".into()),
        },
    );
    assert_eq!(c.scene(), Scene::MeetingCover);
    assert_eq!(c.profile().name, "Sinta");

    let fresh = FlowController::resume(None, &EntryQuery::default());
    assert_eq!(fresh.scene(), Scene::Welcome);

    let unknown = FlowController::resume(
        None,
        &EntryQuery {
            scene: Some("m2q4".into()),
            name: None,
        },
    );
    assert_eq!(unknown.scene(), Scene::Welcome);
}

#[test]
fn unexpected_events_are_rejected_without_moving() {
    let mut c = FlowController::new();
    assert_eq!(
        c.transition(FlowEvent::SubmitScored("750000")),
        Err(FlowError::UnexpectedEvent(Scene::Welcome))
    );
    assert_eq!(c.scene(), Scene::Welcome);
}
