//! End-to-end tests for the reasoning assembler
//!
//! These use in-process backends (echo, failing, mockall) so no network
//! access is needed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{GenerativeBackend, MockGenerativeBackend};
use crate::error::{BackendError, BackendFailureKind, ReasoningError};
use crate::knowledge::{FailureClass, KnowledgeBase};
use crate::sample::Sample;
use crate::{ReasoningAssembler, DETERMINISTIC_TEMPERATURE};

/// Returns the prompt it was given
struct EchoBackend;

#[async_trait]
impl GenerativeBackend for EchoBackend {
    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String, BackendError> {
        Ok(prompt.to_string())
    }
}

/// Fails every call and counts them
#[derive(Default)]
struct FailingBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl GenerativeBackend for FailingBackend {
    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::timeout("simulated timeout"))
    }
}

fn sample() -> Sample {
    Sample::from_pairs([("Fe", 5.0), ("Cu", 2.0)]).unwrap()
}

fn echo_assembler() -> ReasoningAssembler {
    ReasoningAssembler::new(Arc::new(KnowledgeBase::builtin()), Arc::new(EchoBackend))
}

#[tokio::test]
async fn test_echo_round_trip_for_normal() {
    let assembler = echo_assembler();
    let explanation = assembler.explain("normal", &sample()).await.unwrap();

    assert!(explanation.text().contains("Continue scheduled monitoring"));
    assert!(explanation.text().contains("Fe: 5, Cu: 2"));
    assert_eq!(explanation.text(), assembler.prepare("normal", &sample()).unwrap());
}

#[tokio::test]
async fn test_unknown_class_never_reaches_backend() {
    let mut mock = MockGenerativeBackend::new();
    mock.expect_complete().never();

    let assembler = ReasoningAssembler::new(Arc::new(KnowledgeBase::builtin()), Arc::new(mock));
    let err = assembler.explain("turbine_fire", &sample()).await.unwrap_err();

    assert!(matches!(err, ReasoningError::UnknownClass { ref label } if label == "turbine_fire"));
}

#[tokio::test]
async fn test_backend_called_once_at_zero_temperature() {
    let mut mock = MockGenerativeBackend::new();
    mock.expect_complete()
        .withf(|prompt, temperature| {
            prompt.contains("diagnosed as dirt_in_oil") && *temperature == DETERMINISTIC_TEMPERATURE
        })
        .times(1)
        .returning(|_, _| Ok("The Observation: silicon is high".to_string()));

    let assembler = ReasoningAssembler::new(Arc::new(KnowledgeBase::builtin()), Arc::new(mock));
    let explanation = assembler.explain("dirt_in_oil", &sample()).await.unwrap();

    assert_eq!(explanation.text(), "The Observation: silicon is high");
    assert!(!explanation.is_complete());
}

#[tokio::test]
async fn test_backend_failure_propagates_without_retry() {
    let backend = Arc::new(FailingBackend::default());
    let knowledge = Arc::new(KnowledgeBase::builtin());
    let assembler = ReasoningAssembler::new(Arc::clone(&knowledge), backend.clone());

    let err = assembler.explain("sludge_formation", &sample()).await.unwrap_err();
    match err {
        ReasoningError::BackendUnavailable(ref failure) => {
            assert_eq!(failure.kind, BackendFailureKind::Timeout);
        }
        other => panic!("expected BackendUnavailable, got {:?}", other),
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

    // Same inputs, same outcome; nothing was cached or mutated.
    let prompt_before = assembler.prepare("sludge_formation", &sample()).unwrap();
    let again = assembler.explain("sludge_formation", &sample()).await.unwrap_err();
    assert_eq!(again.to_string(), err.to_string());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    assert_eq!(assembler.prepare("sludge_formation", &sample()).unwrap(), prompt_before);
    assert!(knowledge
        .get(FailureClass::SludgeFormation)
        .text()
        .contains("Reduce drain interval"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_cross_talk() {
    let assembler = Arc::new(echo_assembler());

    let mut handles = Vec::new();
    for round in 0..8 {
        for class in FailureClass::ALL {
            let assembler = Arc::clone(&assembler);
            handles.push(tokio::spawn(async move {
                let sample = Sample::from_pairs([("Fe", round as f64), ("Cu", 2.0)]).unwrap();
                let explanation = assembler.explain(class.as_str(), &sample).await.unwrap();
                (class, round, explanation)
            }));
        }
    }

    let knowledge = KnowledgeBase::builtin();
    for handle in handles {
        let (class, round, explanation) = handle.await.unwrap();
        let text = explanation.text();

        assert!(text.contains(&format!("diagnosed as {}.", class)));
        assert!(text.contains(knowledge.get(class).text()));
        assert!(text.contains(&format!("Fe: {}, Cu: 2", round)));

        for other in FailureClass::ALL.iter().filter(|other| **other != class) {
            assert!(!text.contains(&format!("diagnosed as {}.", other)));
        }
    }
}

#[test]
fn test_concurrent_prepare_from_threads() {
    let assembler = Arc::new(echo_assembler());

    let handles: Vec<_> = FailureClass::ALL
        .iter()
        .map(|class| {
            let assembler = Arc::clone(&assembler);
            let class = *class;
            std::thread::spawn(move || {
                (0..50)
                    .map(|_| assembler.prepare(class.as_str(), &sample()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (handle, class) in handles.into_iter().zip(FailureClass::ALL) {
        let prompts = handle.join().unwrap();
        assert!(prompts.iter().all(|prompt| prompt == &prompts[0]));
        assert!(prompts[0].contains(&format!("diagnosed as {}.", class)));
    }
}
