//! The launcher pipeline: list items → select one → dispatch its action.
//!
//! Each stage is awaited to completion before the next starts.  Any transport
//! or decode failure ends the run; an empty listing, a cancelled selection or
//! an unmatched choice end it cleanly without dispatching anything.

use crate::core::codec::{self, DecodeError, ServiceAddr};
use crate::core::item::{self, Item};

use super::selector::{Selector, SelectorError};
use super::transport::{Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("could not list launcher items")]
    Transport(#[source] TransportError),
    #[error("could not decode launcher items")]
    Decode(#[from] DecodeError),
    #[error("selector failed")]
    Selector(#[from] SelectorError),
    #[error("dispatching {label:?} failed; its action may or may not have run")]
    Dispatch {
        label: String,
        #[source]
        source: TransportError,
    },
}

/// Result of the selection stage, borrowing from the listing it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Chosen(&'a Item),
    /// Nothing to choose from, or the user backed out.
    Cancelled,
    /// The selector returned a line that no item carries.
    Unmatched,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cancelled,
    Unmatched { choice: String },
    Dispatched { label: String },
}

/// Ask the launcher service for its items.
pub async fn list_items<T: Transport>(
    transport: &mut T,
    service: ServiceAddr,
) -> Result<Vec<Item>, LaunchError> {
    let request = codec::encode_call(service, &codec::get_items_message());
    let reply = transport
        .call(&request)
        .await
        .map_err(LaunchError::Transport)?;
    let items = codec::decode_listing(&reply)?;
    tracing::debug!(count = items.len(), "listed launcher items");
    Ok(items)
}

/// Present the listing's labels and resolve the choice back to an item.
///
/// The selector is not started for an empty listing.
pub async fn select_item<'a, S: Selector>(
    selector: &mut S,
    items: &'a [Item],
) -> Result<(Selection<'a>, Option<String>), LaunchError> {
    if items.is_empty() {
        tracing::info!("launcher service has no items");
        return Ok((Selection::Cancelled, None));
    }

    let duplicates = item::duplicate_labels(items);
    if !duplicates.is_empty() {
        tracing::warn!(
            ?duplicates,
            "duplicate labels in listing; choosing one picks its first occurrence"
        );
    }

    let lines = item::display_lines(items);
    let Some(choice) = selector.select(&lines).await? else {
        tracing::debug!("selection cancelled");
        return Ok((Selection::Cancelled, None));
    };

    let selection = match item::resolve_choice(items, &choice) {
        Some(item) => Selection::Chosen(item),
        None => {
            tracing::warn!(%choice, "selected line matches no item");
            Selection::Unmatched
        }
    };
    Ok((selection, Some(choice)))
}

/// Ask the runtime to evaluate the item's action.  The reply is discarded
/// and the call is never retried.
pub async fn dispatch<T: Transport>(transport: &mut T, item: &Item) -> Result<(), LaunchError> {
    tracing::debug!(label = %item.label, action = %item.on_click.expr(), "dispatching");
    let request = codec::encode_eval(&item.on_click);
    let reply = transport
        .call(&request)
        .await
        .map_err(|source| LaunchError::Dispatch {
            label: item.label.clone(),
            source,
        })?;
    tracing::debug!(label = %item.label, %reply, "action dispatched");
    Ok(())
}

/// Run the whole pipeline once.
pub async fn run_pipeline<T: Transport, S: Selector>(
    transport: &mut T,
    selector: &mut S,
    service: ServiceAddr,
) -> Result<Outcome, LaunchError> {
    let items = list_items(transport, service).await?;

    let (selection, choice) = select_item(selector, &items).await?;
    let item = match selection {
        Selection::Chosen(item) => item,
        Selection::Cancelled => return Ok(Outcome::Cancelled),
        Selection::Unmatched => {
            return Ok(Outcome::Unmatched {
                choice: choice.unwrap_or_default(),
            })
        }
    };

    dispatch(transport, item).await?;
    Ok(Outcome::Dispatched {
        label: item.label.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned replies and records every request it was given.
    #[derive(Default)]
    struct FakeTransport {
        replies: VecDeque<Result<String, TransportError>>,
        requests: Vec<String>,
    }

    impl FakeTransport {
        fn replying(replies: Vec<Result<String, TransportError>>) -> Self {
            Self {
                replies: replies.into(),
                requests: Vec::new(),
            }
        }
    }

    impl Transport for FakeTransport {
        async fn call(&mut self, request: &str) -> Result<String, TransportError> {
            self.requests.push(request.to_string());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Ok("nil".to_string()))
        }
    }

    /// Returns a fixed answer and records what it was shown.
    struct FakeSelector {
        answer: Option<String>,
        shown: Vec<Vec<String>>,
    }

    impl FakeSelector {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: answer.map(str::to_string),
                shown: Vec::new(),
            }
        }
    }

    impl Selector for FakeSelector {
        async fn select(&mut self, candidates: &[String]) -> Result<Option<String>, SelectorError> {
            self.shown.push(candidates.to_vec());
            Ok(self.answer.clone())
        }
    }

    fn unreachable_runtime() -> TransportError {
        TransportError::Failed {
            program: "vrsctl".into(),
            status: "exit status: 1".into(),
            stderr: "connection refused".into(),
        }
    }

    const LIST_REQUEST: &str = "(call (pid 0) '(:get_items))";
    const AB: &str = r#"((:label "A" :on_click (spawn "e1")) (:label "B" :on_click (spawn "e2")))"#;

    #[tokio::test]
    async fn dispatches_the_chosen_items_action() {
        let mut transport = FakeTransport::replying(vec![Ok(AB.into()), Ok("nil".into())]);
        let mut selector = FakeSelector::answering(Some("B"));

        let outcome = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Dispatched { label: "B".into() });
        assert_eq!(selector.shown, vec![vec!["A".to_string(), "B".to_string()]]);
        assert_eq!(
            transport.requests,
            vec![LIST_REQUEST.to_string(), r#"(eval '(spawn "e2"))"#.to_string()]
        );
    }

    #[tokio::test]
    async fn empty_listing_is_cancelled_without_ui_or_dispatch() {
        let mut transport = FakeTransport::replying(vec![Ok("()".into())]);
        let mut selector = FakeSelector::answering(Some("A"));

        let outcome = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(selector.shown.is_empty());
        assert_eq!(transport.requests, vec![LIST_REQUEST.to_string()]);
    }

    #[tokio::test]
    async fn user_cancel_dispatches_nothing() {
        let mut transport = FakeTransport::replying(vec![Ok(AB.into())]);
        let mut selector = FakeSelector::answering(None);

        let outcome = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(transport.requests.len(), 1);
    }

    #[tokio::test]
    async fn unmatched_choice_dispatches_nothing() {
        let mut transport = FakeTransport::replying(vec![Ok(AB.into())]);
        let mut selector = FakeSelector::answering(Some("C"));

        let outcome = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Unmatched { choice: "C".into() });
        assert_eq!(transport.requests.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_labels_pick_the_first_every_time() {
        let reply = r#"((:label "X" :on_click (first)) (:label "X" :on_click (second)))"#;
        for _ in 0..5 {
            let mut transport = FakeTransport::replying(vec![Ok(reply.into()), Ok("nil".into())]);
            let mut selector = FakeSelector::answering(Some("X"));

            run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
                .await
                .unwrap();

            assert_eq!(transport.requests[1], "(eval '(first))");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn multiline_label_is_one_selector_row() {
        use crate::app::selector::CommandSelector;

        // The runtime prints the embedded newline raw.
        let reply = "((:label \"x\nB\" :on_click (first)) (:label \"B\" :on_click (second)))";
        let mut transport = FakeTransport::replying(vec![Ok(reply.into()), Ok("nil".into())]);
        // Picks the first row, and only when exactly two rows were offered.
        let script = "awk 'NR == 1 { first = $0 } END { if (NR == 2) print first; else exit 2 }'";
        let mut selector = CommandSelector::new("sh", vec!["-c".into(), script.into()]);

        let outcome = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Dispatched { label: "x\nB".into() });
        assert_eq!(transport.requests[1], "(eval '(first))");
    }

    #[tokio::test]
    async fn malformed_reply_aborts_before_selection() {
        let mut transport = FakeTransport::replying(vec![Ok(r#"((:label "A" :on_click (x)"#.into())]);
        let mut selector = FakeSelector::answering(Some("A"));

        let err = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::Decode(_)));
        assert!(selector.shown.is_empty());
        assert_eq!(transport.requests.len(), 1);
    }

    #[tokio::test]
    async fn listing_transport_failure_is_fatal() {
        let mut transport = FakeTransport::replying(vec![Err(unreachable_runtime())]);
        let mut selector = FakeSelector::answering(Some("A"));

        let err = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::Transport(_)));
        assert!(selector.shown.is_empty());
    }

    #[tokio::test]
    async fn dispatch_failure_is_not_retried() {
        let mut transport = FakeTransport::replying(vec![
            Ok(AB.into()),
            Err(unreachable_runtime()),
            Ok("nil".into()),
        ]);
        let mut selector = FakeSelector::answering(Some("A"));

        let err = run_pipeline(&mut transport, &mut selector, ServiceAddr::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::Dispatch { ref label, .. } if label == "A"));
        assert_eq!(
            transport.requests,
            vec![LIST_REQUEST.to_string(), r#"(eval '(spawn "e1"))"#.to_string()]
        );
    }

    #[tokio::test]
    async fn lists_from_configured_service() {
        let mut transport = FakeTransport::replying(vec![Ok("()".into())]);
        let items = list_items(&mut transport, ServiceAddr::Pid(4)).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(transport.requests, vec!["(call (pid 4) '(:get_items))".to_string()]);
    }

    #[tokio::test]
    async fn selection_borrows_from_the_listing() {
        let items = codec::decode_listing(AB).unwrap();
        let mut selector = FakeSelector::answering(Some("A"));
        let (selection, choice) = select_item(&mut selector, &items).await.unwrap();
        match selection {
            Selection::Chosen(item) => assert!(std::ptr::eq(item, &items[0])),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(choice.as_deref(), Some("A"));
    }
}
