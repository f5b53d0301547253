//! Integration tests for events

#[cfg(test)]
mod tests {
    use nxfw_events::*;
    use nxfw_types::{TitleId, TitleVersion};

    #[tokio::test]
    async fn test_event_emitter_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(event1, AppEvent::General(GeneralEvent::Error { .. })));
        assert_eq!(event1.level(), EventLevel::Error);

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
        assert_eq!(event2.level(), EventLevel::Debug);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AppEvent::Resolver(ResolverEvent::Started {
            title_id: TitleId::new(0x0100_0000_0000_0816),
            version: TitleVersion::new(738_263_040),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "resolver");
        assert_eq!(json["event"]["type"], "Started");
        assert_eq!(json["event"]["title_id"], "0100000000000816");
        assert_eq!(event.event_source(), EventSource::RESOLVER);
    }
}
