use showreel::assistant::{project_response, STYLE_RESPONSE, TECHNIQUE_RESPONSE};
use showreel::{Assistant, Catalog, ClientEvent, FallbackResponder, ReplyOrigin, Session};
use std::sync::Arc;

fn session() -> Session {
    Session::new(Arc::new(Catalog::builtin()))
}

fn offline_assistant() -> Assistant {
    Assistant::offline("Kilah Oliver", FallbackResponder::seeded("Kilah", 11))
}

#[test]
fn test_right_arrow_cycles_through_catalog() {
    let mut session = session();
    let indices: Vec<usize> = (0..7)
        .map(|_| {
            session.apply(ClientEvent::Key { key: "ArrowRight".to_string() }).unwrap();
            session.carousel().current_index()
        })
        .collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5, 6, 0]);
}

#[test]
fn test_left_arrow_from_start_wraps_to_end() {
    let mut session = session();
    session.apply(ClientEvent::Key { key: "ArrowLeft".to_string() }).unwrap();
    assert_eq!(session.carousel().current_index(), 6);
    assert_eq!(session.snapshot().view.direction.as_i8(), -1);
}

#[test]
fn test_jump_then_next() {
    for k in 0..7 {
        let mut session = session();
        session.apply(ClientEvent::Jump { index: k }).unwrap();
        session.apply(ClientEvent::Next).unwrap();
        assert_eq!(session.carousel().current_index(), (k + 1) % 7);
    }
}

#[tokio::test]
async fn test_this_project_beats_other_rules() {
    let assistant = offline_assistant();
    let session = session();
    let reply = assistant
        .respond("tell me about this project", session.current_item(), &[])
        .await;
    assert_eq!(reply.origin, ReplyOrigin::Fallback);
    assert_eq!(Some(reply.text.as_str()), project_response("TGI Intro"));
}

#[tokio::test]
async fn test_style_question_gets_style_string() {
    let assistant = offline_assistant();
    let session = session();
    let reply = assistant.respond("what's your style", session.current_item(), &[]).await;
    assert_eq!(reply.text, STYLE_RESPONSE);
}

#[tokio::test]
async fn test_offline_technique_question() {
    let assistant = offline_assistant();
    let mut session = session();
    let pending = session
        .apply(ClientEvent::Chat { text: "how do you do this".to_string() })
        .unwrap()
        .unwrap();
    let item = session.current_item().clone();
    let reply = assistant.respond(&pending.user_text, &item, &pending.context).await;
    let entry = session.finish_reply(pending, reply);
    assert_eq!(entry.text, TECHNIQUE_RESPONSE);
}

#[tokio::test]
async fn test_navigation_keeps_transcript_tail() {
    let assistant = offline_assistant();
    let mut session = session();
    for question in ["what's your style", "tell me about your background"] {
        let pending = session
            .apply(ClientEvent::Chat { text: question.to_string() })
            .unwrap()
            .unwrap();
        let item = session.current_item().clone();
        let reply = assistant.respond(&pending.user_text, &item, &pending.context).await;
        session.finish_reply(pending, reply);
    }
    let tail: Vec<String> = session.chat().transcript()[1..].iter().map(|e| e.text.clone()).collect();

    session.apply(ClientEvent::Jump { index: 5 }).unwrap();

    let transcript = session.chat().transcript();
    assert_eq!(transcript.len(), 5);
    assert!(transcript[0].text.starts_with("Now viewing \"Calming Candles Aromatherapy\""));
    let after: Vec<String> = transcript[1..].iter().map(|e| e.text.clone()).collect();
    assert_eq!(after, tail);
    assert!(session.chat().context_window().is_empty());
}
