//! Scripted companion replies. Keyword lookup over the lowercased message,
//! first matching bucket wins, one canned variant picked at random. Not a
//! substitute for professional care, and says so when asked.

use rand::Rng;

const GREETINGS: &[&str] = &[
    "Hello! I'm your AI mental health companion. I'm here to listen, support, and help you on your wellness journey. How are you feeling today?",
    "Hi there! Welcome to our safe space. I'm here to provide support and guidance whenever you need it. What's on your mind?",
    "Hello! I'm so glad you're here. Taking time for your mental health is important. How can I support you today?",
];

const SAD: &[&str] = &[
    "I hear that you're feeling sad, and I want you to know that your feelings are completely valid. Sadness is a natural human emotion, and it's okay to sit with it. Would you like to talk about what's contributing to these feelings?",
    "Thank you for sharing that you're feeling sad. It takes courage to acknowledge difficult emotions. Remember that sadness, like all emotions, is temporary. What usually helps you feel a little better when you're going through tough times?",
];

const HAPPY: &[&str] = &[
    "I'm so glad to hear you're feeling happy! That's wonderful. Happiness is such a beautiful emotion to experience. What's bringing you joy today? I'd love to celebrate with you!",
    "How amazing that you're feeling happy! It's important to savor these positive moments. What's been going well in your life lately?",
];

const ANXIOUS: &[&str] = &[
    "I understand you're feeling anxious, and I want you to know that anxiety is very common and treatable. Let's take a moment together - can you try taking three deep breaths with me? In for 4, hold for 4, out for 6.",
    "Anxiety can feel overwhelming, but you're not alone in this. Many people experience anxiety, and there are effective ways to manage it. What situations or thoughts tend to trigger your anxiety?",
];

const STRESSED: &[&str] = &[
    "Stress can feel really overwhelming. I'm here to help you work through it. Sometimes breaking things down into smaller, manageable pieces can help. What's the main source of your stress right now?",
    "I hear that you're feeling stressed. That's a lot to carry. Let's think about some coping strategies together. Have you tried any relaxation techniques before?",
];

const SUPPORTIVE: &[&str] = &[
    "You're incredibly brave for reaching out and sharing your feelings. That takes real strength.",
    "I want you to know that you're not alone in this. Many people go through similar experiences, and there is hope.",
    "Your feelings are valid, and you deserve support and compassion - especially from yourself.",
    "It's okay to not have all the answers right now. Healing and growth take time, and that's perfectly normal.",
    "You've taken an important step by being here and focusing on your mental health. That shows real self-awareness and care.",
];

const COPING: &[&str] = &[
    "Here are some gentle coping strategies you might try: deep breathing exercises, going for a short walk, listening to calming music, or writing in a journal. What feels most appealing to you right now?",
    "Some helpful techniques include: practicing mindfulness, doing progressive muscle relaxation, calling a trusted friend, or engaging in a creative activity. Which of these resonates with you?",
    "Consider trying: the 5-4-3-2-1 grounding technique (5 things you see, 4 you hear, 3 you touch, 2 you smell, 1 you taste), gentle stretching, or practicing self-compassion. What sounds most helpful?",
];

const ENCOURAGEMENT: &[&str] = &[
    "You are stronger than you know, and you have the inner resources to get through this. I believe in you.",
    "Every small step you take toward caring for your mental health matters. You're doing important work.",
    "Remember that healing isn't linear - there will be ups and downs, and that's completely normal. Be patient with yourself.",
    "You deserve happiness, peace, and all good things in life. Don't let anyone, including yourself, tell you otherwise.",
];

const PROFESSIONAL_HELP: &[&str] = &[
    "While I'm here to provide support, please remember that I'm an AI assistant and not a replacement for professional mental health care. If you're experiencing persistent difficulties, consider reaching out to a licensed therapist or counselor.",
    "If you're having thoughts of self-harm or suicide, please reach out for immediate help: National Suicide Prevention Lifeline (988), Crisis Text Line (text HOME to 741741), or your local emergency services.",
    "It's always okay to seek professional help. Therapists, counselors, and mental health professionals are trained to provide specialized support that can be incredibly valuable.",
];

fn pick(options: &[&str]) -> String {
    let mut rng = rand::thread_rng();
    options[rng.gen_range(0..options.len())].to_string()
}

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| message.contains(k))
}

/// `history_len` is the number of messages already in the session; the first
/// exchange always gets a greeting, keywords or not.
pub fn generate_reply(message: &str, history_len: usize) -> String {
    let message = message.to_lowercase();

    if contains_any(&message, &["hello", "hi", "hey"]) || history_len <= 1 {
        return pick(GREETINGS);
    }

    if contains_any(&message, &["sad", "down", "depressed"]) {
        return pick(SAD);
    }

    if contains_any(&message, &["happy", "good", "great", "wonderful"]) {
        return pick(HAPPY);
    }

    if contains_any(&message, &["anxious", "anxiety", "worried", "nervous"]) {
        return pick(ANXIOUS);
    }

    if contains_any(&message, &["stressed", "stress", "overwhelmed"]) {
        return pick(STRESSED);
    }

    if contains_any(&message, &["help", "cope", "what should i do"]) {
        return pick(COPING);
    }

    if contains_any(&message, &["therapist", "professional", "counselor"]) {
        return pick(PROFESSIONAL_HELP);
    }

    let fallback: Vec<&str> = SUPPORTIVE
        .iter()
        .chain(ENCOURAGEMENT.iter())
        .copied()
        .collect();
    pick(&fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_exchange_always_greets() {
        for history_len in [0, 1] {
            let reply = generate_reply("my day was rotten", history_len);
            assert!(GREETINGS.contains(&reply.as_str()));
        }
    }

    #[test]
    fn greeting_keywords_greet_even_late_in_a_session() {
        let reply = generate_reply("Hello again", 12);
        assert!(GREETINGS.contains(&reply.as_str()));
    }

    #[test]
    fn keywords_route_to_their_bucket() {
        let reply = generate_reply("I feel so sad today", 5);
        assert!(SAD.contains(&reply.as_str()));

        let reply = generate_reply("work has me really stressed", 5);
        assert!(STRESSED.contains(&reply.as_str()));

        let reply = generate_reply("I'm worried about tomorrow", 5);
        assert!(ANXIOUS.contains(&reply.as_str()));

        let reply = generate_reply("wondering if I need a therapist", 5);
        assert!(PROFESSIONAL_HELP.contains(&reply.as_str()));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let reply = generate_reply("FEELING SAD", 5);
        assert!(SAD.contains(&reply.as_str()));
    }

    #[test]
    fn earlier_rules_win_over_later_ones() {
        // both "sad" and "help" appear; the sad bucket comes first
        let reply = generate_reply("I'm sad, can you help me?", 5);
        assert!(SAD.contains(&reply.as_str()));
    }

    #[test]
    fn unmatched_messages_get_a_supportive_reply() {
        let reply = generate_reply("tell me about mindfulness", 5);
        let supportive = SUPPORTIVE.contains(&reply.as_str());
        let encouraging = ENCOURAGEMENT.contains(&reply.as_str());
        assert!(supportive || encouraging);
    }
}
