use railsecure::error::InvalidStateError;
use railsecure::models::*;
use railsecure::session::Session;
use speculate2::speculate;

fn key(module: &str, slot: &str) -> SlotKey {
    SlotKey::new(module, slot)
}

speculate! {
    before {
        let mut session = Session::new();
        let sample = key("phishing", "sample");
    }

    describe "get" {
        it "returns an unrequested item for a slot never written" {
            let item = session.get(&key("scenario", "current"));
            assert_eq!(item.status(), ItemStatus::Unrequested);
            assert!(item.content().is_none());
            assert!(item.user_response.is_none());
            assert!(item.evaluation.is_none());
        }

        it "does not create the slot" {
            session.get(&sample);
            assert!(session.slots().is_empty());
        }
    }

    describe "begin_request" {
        it "marks the slot pending with the prompt" {
            session.begin_request(sample.clone(), "Generate a phishing email");

            let item = session.get(&sample);
            assert_eq!(item.status(), ItemStatus::Pending);
            assert_eq!(item.prompt.map(|p| p.user), Some("Generate a phishing email".to_string()));
        }

        it "discards earlier content and response" {
            let first = session.begin_request(sample.clone(), "first");
            session.complete_request(&sample, first, "Subject: Urgent");
            session.record_user_response(&sample, "The link is fake").unwrap();

            session.begin_request(sample.clone(), "second");

            let item = session.get(&sample);
            assert_eq!(item.status(), ItemStatus::Pending);
            assert!(item.content().is_none());
            assert!(item.user_response.is_none());
        }
    }

    describe "complete_request" {
        it "stores content and marks the slot ready" {
            let ticket = session.begin_request(sample.clone(), "Generate a phishing email");
            assert!(session.complete_request(&sample, ticket, "Subject: Urgent"));

            let item = session.get(&sample);
            assert_eq!(item.status(), ItemStatus::Ready);
            assert_eq!(item.content(), Some("Subject: Urgent"));
        }

        it "ignores a completion for a superseded request" {
            let quiz = key("quiz", "questions");
            let stale = session.begin_request(quiz.clone(), "first quiz");
            let current = session.begin_request(quiz.clone(), "second quiz");

            assert!(!session.complete_request(&quiz, stale, "old questions"));

            let item = session.get(&quiz);
            assert_eq!(item.status(), ItemStatus::Pending);
            assert_eq!(item.pending_ticket(), Some(current));
        }

        it "ignores a completion after the slot was cleared" {
            let ticket = session.begin_request(sample.clone(), "prompt");
            session.clear(&sample);

            assert!(!session.complete_request(&sample, ticket, "late"));
            assert_eq!(session.get(&sample).status(), ItemStatus::Unrequested);
        }
    }

    describe "fail_request" {
        it "records the reason and allows a retry" {
            let quiz = key("quiz", "q1");
            let ticket = session.begin_request(quiz.clone(), "quiz prompt");
            assert!(session.fail_request(&quiz, ticket, "timeout"));

            let item = session.get(&quiz);
            assert_eq!(item.status(), ItemStatus::Failed);
            assert_eq!(item.failure_reason(), Some("timeout"));

            let retry = session.begin_request(quiz.clone(), "quiz prompt");
            assert_eq!(session.get(&quiz).status(), ItemStatus::Pending);
            assert!(session.complete_request(&quiz, retry, "Question: ..."));
            assert_eq!(session.get(&quiz).status(), ItemStatus::Ready);
        }

        it "ignores a failure for a superseded request" {
            let stale = session.begin_request(sample.clone(), "first");
            let current = session.begin_request(sample.clone(), "second");
            session.complete_request(&sample, current, "fresh email");

            assert!(!session.fail_request(&sample, stale, "timeout"));
            assert_eq!(session.get(&sample).content(), Some("fresh email"));
        }
    }

    describe "record_user_response" {
        it "attaches the response to ready content" {
            let ticket = session.begin_request(sample.clone(), "prompt");
            session.complete_request(&sample, ticket, "Subject: Urgent");

            session.record_user_response(&sample, "The sender domain is wrong").unwrap();

            let item = session.get(&sample);
            assert_eq!(item.user_response.as_deref(), Some("The sender domain is wrong"));
            assert_eq!(item.content(), Some("Subject: Urgent"));
        }

        it "rejects an unrequested slot and leaves it unchanged" {
            let scenario = key("scenario", "current");
            let err = session.record_user_response(&scenario, "Isolate the network").unwrap_err();

            assert_eq!(
                err,
                InvalidStateError::NotReady {
                    key: scenario.clone(),
                    status: ItemStatus::Unrequested,
                }
            );
            assert_eq!(session.get(&scenario).status(), ItemStatus::Unrequested);
            assert!(session.get(&scenario).user_response.is_none());
        }

        it "rejects a pending slot" {
            session.begin_request(sample.clone(), "prompt");
            let err = session.record_user_response(&sample, "too early").unwrap_err();
            assert!(matches!(err, InvalidStateError::NotReady { status: ItemStatus::Pending, .. }));
        }

        it "rejects a failed slot" {
            let ticket = session.begin_request(sample.clone(), "prompt");
            session.fail_request(&sample, ticket, "quota exceeded");
            assert!(session.record_user_response(&sample, "anything").is_err());
        }
    }

    describe "evaluation" {
        before {
            let ticket = session.begin_request(sample.clone(), "prompt");
            session.complete_request(&sample, ticket, "Subject: Urgent");
        }

        it "requires a recorded response" {
            let err = session.begin_evaluation(&sample, "evaluate").unwrap_err();
            assert_eq!(err, InvalidStateError::NoUserResponse { key: sample.clone() });
        }

        it "nests the evaluation under the item" {
            session.record_user_response(&sample, "Look-alike domain").unwrap();
            let ticket = session.begin_evaluation(&sample, "evaluate").unwrap();
            assert_eq!(
                session.get(&sample).evaluation.map(|e| e.status()),
                Some(ItemStatus::Pending)
            );

            assert!(session.complete_evaluation(&sample, ticket, "Well spotted"));

            let item = session.get(&sample);
            let evaluation = item.evaluation.as_ref().expect("evaluation present");
            assert_eq!(evaluation.content(), Some("Well spotted"));
            assert_eq!(item.status(), ItemStatus::Ready);
        }

        it "is dropped when a new response is recorded" {
            session.record_user_response(&sample, "first try").unwrap();
            let ticket = session.begin_evaluation(&sample, "evaluate").unwrap();
            session.complete_evaluation(&sample, ticket, "Missed the link");

            session.record_user_response(&sample, "second try").unwrap();
            assert!(session.get(&sample).evaluation.is_none());
        }

        it "ignores a stale evaluation result" {
            session.record_user_response(&sample, "answer").unwrap();
            let stale = session.begin_evaluation(&sample, "evaluate").unwrap();
            let _current = session.begin_evaluation(&sample, "evaluate again").unwrap();

            assert!(!session.fail_evaluation(&sample, stale, "timeout"));
            assert_eq!(
                session.get(&sample).evaluation.map(|e| e.status()),
                Some(ItemStatus::Pending)
            );
        }
    }

    describe "clear" {
        it "always returns the slot to unrequested" {
            let ticket = session.begin_request(sample.clone(), "prompt");
            session.complete_request(&sample, ticket, "content");
            session.record_user_response(&sample, "response").unwrap();

            session.clear(&sample);
            assert_eq!(session.get(&sample), GeneratedItem::default());

            session.clear(&key("never", "written"));
            assert_eq!(session.get(&key("never", "written")).status(), ItemStatus::Unrequested);
        }

        it "clears every slot of a module only" {
            let analysis = key("phishing", "analysis");
            let guide = key("incident_response", "custom_guide");
            session.begin_request(sample.clone(), "a");
            session.begin_request(analysis.clone(), "b");
            session.begin_request(guide.clone(), "c");

            session.clear_module("phishing");

            let remaining: Vec<SlotKey> = session.slots().into_iter().map(|e| e.key).collect();
            assert_eq!(remaining, vec![guide]);
        }
    }

    describe "slot independence" {
        it "keeps slots of different modules apart" {
            let compliance = key("compliance", "answer");
            let reference = key("reference", "answer");
            let t1 = session.begin_request(compliance.clone(), "GDPR?");
            let t2 = session.begin_request(reference.clone(), "NIS2?");

            session.complete_request(&compliance, t1, "GDPR answer");
            session.fail_request(&reference, t2, "rate limited");

            assert_eq!(session.get(&compliance).content(), Some("GDPR answer"));
            assert_eq!(session.get(&reference).status(), ItemStatus::Failed);
        }
    }
}
