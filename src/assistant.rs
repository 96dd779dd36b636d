//! Reply resolution for the portfolio assistant.
//!
//! Two strategies exist. When a completion backend was configured at startup
//! the question goes to the hosted model; any failure there degrades to a
//! fixed apology. Without a backend a rule-based responder picks canned copy.
//! Either way `Assistant::respond` always yields a reply, never an error.

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::catalog::PortfolioItem;
use crate::completion::{CompletionBackend, CompletionRequest, ContextEntry, HostedCompletion};
use crate::config::Settings;

/// Most recent context entries (five exchanges) kept for the remote call.
pub const CONTEXT_WINDOW_LIMIT: usize = 10;

pub const APOLOGY: &str =
    "I'm having trouble connecting right now. Please try again in a moment, or keep exploring the portfolio!";

pub const STYLE_RESPONSE: &str = "Kilah's signature style combines cinematic storytelling with authentic brand representation. She focuses on capturing genuine moments while maintaining high production value and visual aesthetics.";

pub const TECHNIQUE_RESPONSE: &str = "Kilah uses a combination of dynamic camera movements, thoughtful composition, and strategic lighting to create engaging visual narratives. She's particularly skilled at capturing both product details and lifestyle contexts.";

pub const BACKGROUND_RESPONSE: &str = "Kilah Oliver is a creative professional specializing in brand storytelling through video. Her portfolio spans commercial work, event coverage, lifestyle brands, and artisan showcases, demonstrating versatility across industries.";

pub const CONTACT_RESPONSE: &str = "Interested in working with Kilah? Her diverse portfolio shows expertise in brand videos, event coverage, product showcases, and lifestyle content. Each project is approached with creativity and professional excellence.";

pub const DEFAULT_RESPONSES: [&str; 3] = [
    "That's a great question! Kilah's work really shines in how she combines technical skill with creative storytelling. What specific aspect interests you most?",
    "Kilah's portfolio demonstrates incredible range across different industries. Each project has its own unique approach while maintaining her signature style.",
    "I love discussing Kilah's creative process! She has a talent for making every brand feel authentic and engaging. What would you like to explore?",
];

lazy_static! {
    /// Canned paragraphs keyed by lower-cased project title.
    static ref PROJECT_RESPONSES: HashMap<&'static str, &'static str> = HashMap::from([
        ("tgi intro", "The TGI Intro showcases Kilah's mastery of brand storytelling. She uses dynamic transitions and bold visual elements to create an immediately engaging introduction that captures attention within the first few seconds."),
        ("raleigh event", "This live event coverage demonstrates Kilah's ability to capture authentic moments and energy. She focuses on candid interactions and atmospheric shots that make viewers feel like they're part of the experience."),
        ("open butterfly jewelry", "Kilah's approach to jewelry videography emphasizes intimate close-ups and elegant lighting. She creates a sense of luxury and craftsmanship through careful attention to reflections and textures."),
        ("lucy lu's boutique", "For fashion retail, Kilah combines lifestyle storytelling with product showcase. She captures both the aspirational aspects of fashion and the authentic shopping experience."),
        ("juicy vybz", "This lifestyle brand video shows Kilah's ability to capture authentic culture and energy. She uses vibrant colors and dynamic movement to reflect the brand's personality."),
        ("calming candles aromatherapy", "Kilah creates a meditative viewing experience here, using soft lighting and slow, deliberate movements that mirror the calming nature of aromatherapy."),
        ("a great day candle company", "This artisan showcase highlights Kilah's skill in documenting craftsmanship. She focuses on the hands-on process and attention to detail that goes into handmade products."),
    ]);
}

/// Canned paragraph for a project, looked up by exact lower-cased title.
pub fn project_response(title: &str) -> Option<&'static str> {
    PROJECT_RESPONSES.get(title.to_lowercase().as_str()).copied()
}

fn contains_any(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| message.contains(needle))
}

/// Which fallback rule a question falls under. Variants are listed in
/// precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    CurrentProject,
    Style,
    Technique,
    Background,
    Contact,
    Other,
}

impl Topic {
    /// First matching rule wins. Plain substring tests on the lower-cased input.
    pub fn classify(user_text: &str, item: &PortfolioItem) -> Self {
        let message = user_text.to_lowercase();

        if contains_any(&message, &["this project", "this video"]) || message.contains(&item.title.to_lowercase()) {
            Topic::CurrentProject
        } else if contains_any(&message, &["style", "approach"]) {
            Topic::Style
        } else if contains_any(&message, &["technique", "how"]) {
            Topic::Technique
        } else if contains_any(&message, &["experience", "background"]) {
            Topic::Background
        } else if contains_any(&message, &["contact", "hire", "work"]) {
            Topic::Contact
        } else {
            Topic::Other
        }
    }
}

/// Deterministic rule-based replies, plus one random pick for questions no
/// rule covers. The random source is injectable so tests can seed it.
pub struct FallbackResponder {
    owner_first_name: String,
    rng: Mutex<StdRng>,
}

impl FallbackResponder {
    pub fn new(owner_first_name: impl Into<String>) -> Self {
        Self::with_rng(owner_first_name, StdRng::from_entropy())
    }

    pub fn seeded(owner_first_name: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(owner_first_name, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(owner_first_name: impl Into<String>, rng: StdRng) -> Self {
        Self {
            owner_first_name: owner_first_name.into(),
            rng: Mutex::new(rng),
        }
    }

    pub fn respond(&self, user_text: &str, item: &PortfolioItem) -> String {
        let topic = Topic::classify(user_text, item);
        debug!(?topic, item = %item.title, "Fallback responder matched topic");
        match topic {
            Topic::CurrentProject => project_response(&item.title)
                .map(str::to_string)
                .unwrap_or_else(|| self.describe_project(item)),
            Topic::Style => STYLE_RESPONSE.to_string(),
            Topic::Technique => TECHNIQUE_RESPONSE.to_string(),
            Topic::Background => BACKGROUND_RESPONSE.to_string(),
            Topic::Contact => CONTACT_RESPONSE.to_string(),
            Topic::Other => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                DEFAULT_RESPONSES[rng.gen_range(0..DEFAULT_RESPONSES.len())].to_string()
            }
        }
    }

    fn describe_project(&self, item: &PortfolioItem) -> String {
        format!(
            "\"{}\" is a {} project that {}. {}'s approach here emphasizes authentic storytelling and visual excellence.",
            item.title,
            item.category,
            item.description.to_lowercase(),
            self.owner_first_name
        )
    }
}

/// Where a reply came from. The text is shown the same way in every case;
/// this only lets callers tell a degraded apology apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrigin {
    Remote,
    Fallback,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub origin: ReplyOrigin,
}

impl Reply {
    /// Only genuine remote completions feed the context window.
    pub fn extends_context(&self) -> bool {
        self.origin == ReplyOrigin::Remote
    }
}

pub struct Assistant {
    owner: String,
    backend: Option<Arc<dyn CompletionBackend>>,
    fallback: FallbackResponder,
}

impl Assistant {
    /// `backend` is the capability flag: `Some` selects the remote strategy
    /// for the whole lifetime of the assistant.
    pub fn new(
        owner: impl Into<String>,
        backend: Option<Arc<dyn CompletionBackend>>,
        fallback: FallbackResponder,
    ) -> Self {
        Self {
            owner: owner.into(),
            backend,
            fallback,
        }
    }

    /// Rule-based assistant with no remote capability.
    pub fn offline(owner: impl Into<String>, fallback: FallbackResponder) -> Self {
        Self::new(owner, None, fallback)
    }

    pub fn from_settings(owner: &str, owner_first_name: &str, settings: &Settings) -> Self {
        let backend = HostedCompletion::from_settings(settings)
            .map(|hosted| Arc::new(hosted) as Arc<dyn CompletionBackend>);
        if backend.is_some() {
            info!(model = %settings.model, api_base = %settings.api_base, "Assistant using hosted completions");
        } else {
            info!("No API key configured, assistant using canned replies");
        }
        Self::new(owner, backend, FallbackResponder::new(owner_first_name))
    }

    pub fn remote_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn respond(&self, user_text: &str, item: &PortfolioItem, context: &[ContextEntry]) -> Reply {
        let Some(backend) = &self.backend else {
            return Reply {
                text: self.fallback.respond(user_text, item),
                origin: ReplyOrigin::Fallback,
            };
        };

        let start = context.len().saturating_sub(CONTEXT_WINDOW_LIMIT);
        let request = CompletionRequest {
            user_text: user_text.to_string(),
            owner: self.owner.clone(),
            item: item.clone(),
            prior: context[start..].to_vec(),
        };

        match backend.complete(&request).await {
            Ok(text) => Reply {
                text,
                origin: ReplyOrigin::Remote,
            },
            Err(e) => {
                warn!(error = %e, item = %item.title, "Completion failed, answering with apology");
                Reply {
                    text: APOLOGY.to_string(),
                    origin: ReplyOrigin::Degraded,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::CompletionError;
    use async_trait::async_trait;

    fn tgi() -> PortfolioItem {
        Catalog::builtin().get(0).unwrap().clone()
    }

    fn offline() -> Assistant {
        Assistant::offline("Kilah Oliver", FallbackResponder::seeded("Kilah", 7))
    }

    struct Failing;

    #[async_trait]
    impl CompletionBackend for Failing {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
            Err(CompletionError::EmptyResponse)
        }
    }

    struct Recording(Mutex<Vec<CompletionRequest>>);

    #[async_trait]
    impl CompletionBackend for Recording {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.0.lock().unwrap().push(request.clone());
            Ok("remote answer".to_string())
        }
    }

    #[test]
    fn test_topic_precedence() {
        let item = tgi();
        assert_eq!(Topic::classify("Tell me about THIS PROJECT's style", &item), Topic::CurrentProject);
        assert_eq!(Topic::classify("what about tgi intro?", &item), Topic::CurrentProject);
        assert_eq!(Topic::classify("what's your style and technique", &item), Topic::Style);
        assert_eq!(Topic::classify("how was it shot", &item), Topic::Technique);
        assert_eq!(Topic::classify("what's her background", &item), Topic::Background);
        assert_eq!(Topic::classify("can I hire her", &item), Topic::Contact);
        assert_eq!(Topic::classify("nice!", &item), Topic::Other);
    }

    #[test]
    fn test_substring_not_token_match() {
        // "show" contains "how", so it lands on the technique rule.
        assert_eq!(Topic::classify("show me more", &tgi()), Topic::Technique);
        // "network" contains "work".
        assert_eq!(Topic::classify("your network?", &tgi()), Topic::Contact);
    }

    #[test]
    fn test_canned_project_paragraph() {
        let responder = FallbackResponder::seeded("Kilah", 1);
        let reply = responder.respond("tell me about this project", &tgi());
        assert!(reply.starts_with("The TGI Intro showcases"));
    }

    #[test]
    fn test_every_builtin_title_has_canned_paragraph() {
        for item in Catalog::builtin().items() {
            assert!(project_response(&item.title).is_some(), "missing {}", item.title);
        }
    }

    #[test]
    fn test_unknown_title_gets_generic_sentence() {
        let item = PortfolioItem::new(99, "Night Market", "Street Documentary", "2025", "Follows Vendors After Dark", "nm.mp4");
        let responder = FallbackResponder::seeded("Kilah", 1);
        let reply = responder.respond("what is this video about?", &item);
        assert_eq!(
            reply,
            "\"Night Market\" is a Street Documentary project that follows vendors after dark. Kilah's approach here emphasizes authentic storytelling and visual excellence."
        );
    }

    #[test]
    fn test_default_pick_is_seeded() {
        let a = FallbackResponder::seeded("Kilah", 42);
        let b = FallbackResponder::seeded("Kilah", 42);
        for _ in 0..10 {
            let first = a.respond("hello there", &tgi());
            let second = b.respond("hello there", &tgi());
            assert_eq!(first, second);
            assert!(DEFAULT_RESPONSES.contains(&first.as_str()));
        }
    }

    #[tokio::test]
    async fn test_offline_assistant_uses_fallback() {
        let assistant = offline();
        assert!(!assistant.remote_enabled());
        let reply = assistant.respond("how do you do this", &tgi(), &[]).await;
        assert_eq!(reply.text, TECHNIQUE_RESPONSE);
        assert_eq!(reply.origin, ReplyOrigin::Fallback);
        assert!(!reply.extends_context());
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_apology() {
        let assistant = Assistant::new("Kilah Oliver", Some(Arc::new(Failing) as Arc<dyn CompletionBackend>), FallbackResponder::seeded("Kilah", 1));
        let reply = assistant.respond("anything", &tgi(), &[]).await;
        assert_eq!(reply.text, APOLOGY);
        assert_eq!(reply.origin, ReplyOrigin::Degraded);
    }

    #[tokio::test]
    async fn test_remote_request_carries_last_ten_entries() {
        let backend = Arc::new(Recording(Mutex::new(Vec::new())));
        let assistant = Assistant::new("Kilah Oliver", Some(backend.clone() as Arc<dyn CompletionBackend>), FallbackResponder::seeded("Kilah", 1));

        let context: Vec<ContextEntry> = (0..14).map(|i| ContextEntry::user(format!("q{}", i))).collect();
        let reply = assistant.respond("and then?", &tgi(), &context).await;
        assert_eq!(reply.origin, ReplyOrigin::Remote);
        assert!(reply.extends_context());

        let requests = backend.0.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prior.len(), CONTEXT_WINDOW_LIMIT);
        assert_eq!(requests[0].prior[0].content, "q4");
        assert_eq!(requests[0].item.title, "TGI Intro");
        assert_eq!(requests[0].owner, "Kilah Oliver");
    }

    #[test]
    fn test_from_settings_resolves_capability_once() {
        let mut settings = Settings::default();
        assert!(!Assistant::from_settings("Kilah Oliver", "Kilah", &settings).remote_enabled());
        settings.api_key = Some("sk-test".to_string());
        assert!(Assistant::from_settings("Kilah Oliver", "Kilah", &settings).remote_enabled());
    }
}
