//! Scripted conversation shown on the chat scene.

/// Who said a line in the simulated client chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Client,
    Participant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: u32,
    pub text: String,
    pub sender: Sender,
    /// Canned replies the participant can pick from.
    pub responses: Vec<&'static str>,
}

/// The opening conversation with Ayu, the fictional café owner. Falls back
/// to a neutral address when no name is registered yet.
pub fn conversation_for(user_name: &str) -> Vec<ChatMessage> {
    let addressed = if user_name.is_empty() { "Anda" } else { user_name };
    vec![
        ChatMessage {
            id: 1,
            text: format!(
                "Halo aku Ayu, owner dari kafe Kopi & Bunga Melati. \
                 Apakah benar ini dengan {addressed}?"
            ),
            sender: Sender::Client,
            responses: vec!["Halo salam kenal! Ada yang bisa aku bantu?"],
        },
        ChatMessage {
            id: 2,
            text: "Aku mau mulai promosi kafe di media sosial, tapi bingung harus mulai \
                   dari mana. Boleh minta tolong?"
                .to_string(),
            sender: Sender::Client,
            responses: vec!["Tentu, ayo kita lihat sama-sama!"],
        },
    ]
}
