//! Canned-response engine for the live-chat widget.
//!
//! A flat, ordered chain of case-insensitive substring tests. The first rule
//! with any matching keyword wins; a message that matches nothing gets one of
//! four fallback replies picked at random. There is no scoring, ranking, or
//! session state — the whole point is that a visitor gets an instant,
//! on-brand answer while the team follows up by email.

use uuid::Uuid;

/// One keyword rule: if any keyword occurs in the lowercased message, the
/// rule's reply is returned.
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

/// The rule chain, checked in order. Earlier rules shadow later ones, so a
/// message mentioning both price and timeline gets the pricing reply.
pub const RULES: &[Rule] = &[
    Rule {
        keywords: &["price", "cost", "pricing"],
        reply: "Our pricing varies based on project complexity. For a custom quote, \
                please check our pricing section or contact us directly. We offer \
                competitive rates for web development, mobile apps, and design services.",
    },
    Rule {
        keywords: &["portfolio", "work", "examples"],
        reply: "You can view our portfolio showcasing various projects including \
                e-commerce sites, business websites, and mobile applications. Would \
                you like me to direct you to our portfolio section?",
    },
    Rule {
        keywords: &["mobile", "app"],
        reply: "We develop both iOS and Android mobile applications using modern \
                technologies. Our apps are designed for optimal performance and user \
                experience. What type of mobile app are you looking to develop?",
    },
    Rule {
        keywords: &["website", "web"],
        reply: "We create custom, responsive websites tailored to your business \
                needs. This includes e-commerce sites, business websites, portfolios, \
                and more. What type of website do you need?",
    },
    Rule {
        keywords: &["contact", "quote", "estimate"],
        reply: "I'd be happy to connect you with our team for a detailed quote. You \
                can fill out our contact form or call us directly. What's your \
                project about?",
    },
    Rule {
        keywords: &["hello", "hi", "hey"],
        reply: "Hello! Thanks for reaching out to ThinkBright Web Solutions. I'm \
                here to help you with any questions about our web development and \
                mobile app services. What can I assist you with today?",
    },
    Rule {
        keywords: &["time", "timeline", "how long"],
        reply: "Project timelines vary depending on complexity. A basic website \
                typically takes 2-4 weeks, while more complex applications can take \
                6-12 weeks. We'll provide a detailed timeline after understanding \
                your requirements.",
    },
    Rule {
        keywords: &["support", "maintenance"],
        reply: "We offer ongoing support and maintenance services including regular \
                updates, security monitoring, and technical support. Our team is \
                available 24/7 to ensure your website runs smoothly.",
    },
];

/// Replies used when no rule matches, picked uniformly at random.
pub const FALLBACK_REPLIES: [&str; 4] = [
    "That's a great question! Our team would be happy to discuss this with you \
     in detail. Would you like to schedule a consultation?",
    "I'd love to help you with that. Can you tell me more about your specific \
     needs so I can provide better assistance?",
    "Thanks for your interest in ThinkBright Web Solutions! For detailed \
     information about this, I recommend speaking with one of our specialists. \
     Shall I connect you?",
    "That sounds like an interesting project! Our team has experience with \
     various types of solutions. Would you like to discuss your requirements \
     with our experts?",
];

/// Produce the bot reply for a visitor message.
pub fn reply_to(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    for rule in RULES {
        if rule.keywords.iter().any(|k| lowered.contains(k)) {
            return rule.reply;
        }
    }
    FALLBACK_REPLIES[fallback_index()]
}

/// Uniform index into [`FALLBACK_REPLIES`]. A freshly generated UUIDv4 is
/// 122 random bits, which is plenty of entropy for picking one of four
/// canned strings.
fn fallback_index() -> usize {
    (Uuid::new_v4().as_u128() % FALLBACK_REPLIES.len() as u128) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_keywords() {
        for msg in ["price?", "What does it COST", "your pricing page"] {
            assert!(reply_to(msg).starts_with("Our pricing varies"), "{msg}");
        }
    }

    #[test]
    fn test_portfolio_keywords() {
        assert!(reply_to("can I see examples of your work").starts_with("You can view our portfolio"));
    }

    #[test]
    fn test_mobile_and_website_rules() {
        assert!(reply_to("I need an app").starts_with("We develop both iOS and Android"));
        assert!(reply_to("build me a website").starts_with("We create custom, responsive"));
    }

    #[test]
    fn test_contact_greeting_timeline_support() {
        assert!(reply_to("send me a quote").starts_with("I'd be happy to connect"));
        assert!(reply_to("hello there").starts_with("Hello! Thanks for reaching out"));
        assert!(reply_to("how long does it take").starts_with("Project timelines vary"));
        assert!(reply_to("do you do maintenance").starts_with("We offer ongoing support"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(reply_to("PRICE"), reply_to("price"));
    }

    #[test]
    fn test_earlier_rule_wins_on_overlap() {
        // Mentions price (rule 1) and mobile app (rule 3): rule 1 shadows.
        let reply = reply_to("what is the price of a mobile app?");
        assert!(reply.starts_with("Our pricing varies"));

        // Mentions timeline (rule 7) and website (rule 4): rule 4 comes first.
        let reply = reply_to("website timeline?");
        assert!(reply.starts_with("We create custom, responsive"));
    }

    #[test]
    fn test_substring_semantics() {
        // "hi" matches inside larger words once earlier rules miss.
        assert!(reply_to("think").starts_with("Hello! Thanks for reaching out"));
    }

    #[test]
    fn test_unmatched_message_gets_a_fallback() {
        for _ in 0..16 {
            let reply = reply_to("zzz qqq");
            assert!(FALLBACK_REPLIES.contains(&reply));
        }
    }

    #[test]
    fn test_empty_message_gets_a_fallback() {
        assert!(FALLBACK_REPLIES.contains(&reply_to("")));
    }
}
