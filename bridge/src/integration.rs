//! End-to-end tests for the debug bridge
//!
//! Drives the bridge the way a render loop and an inspector connection do:
//! registration, per-frame publishing and inbound edit messages.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::bridge::DebugBridge;
    use crate::config::BridgeConfig;
    use crate::flag::DebugFlag;
    use crate::message::EditEvent;
    use crate::path::{PathSegment, PropertyPath};
    use crate::payload::Payload;
    use crate::registry::{ModelId, Renderable, SharedRenderable};
    use crate::test_utils::TestModel;
    use crate::transport::{BufferedTransport, OutboundMessage};
    use crate::value::{HostFunction, NumericBuffer, Value, ValueMap, value_map};

    // ============================================================================
    // Helpers
    // ============================================================================

    fn unthrottled() -> BridgeConfig {
        BridgeConfig {
            throttle_ms: 0,
            ..BridgeConfig::default()
        }
    }

    fn bridge(config: BridgeConfig, initialized: bool) -> DebugBridge<BufferedTransport> {
        DebugBridge::new(config, DebugFlag::new(initialized), BufferedTransport::new())
    }

    fn white() -> ValueMap {
        value_map([("color", Value::numbers([1.0, 1.0, 1.0]))])
    }

    fn register(
        bridge: &mut DebugBridge<BufferedTransport>,
        model: TestModel,
    ) -> Rc<RefCell<TestModel>> {
        let model = model.into_shared();
        let shared: SharedRenderable = model.clone();
        bridge.register(&shared);
        model
    }

    fn batch_updates(bridge: &DebugBridge<BufferedTransport>) -> Vec<&OutboundMessage> {
        bridge
            .transport()
            .messages()
            .iter()
            .filter(|m| matches!(m, OutboundMessage::BatchUpdate { .. }))
            .collect()
    }

    /// Data sent under `path` in the most recent batch
    fn last_published(bridge: &DebugBridge<BufferedTransport>, path: &str) -> Payload {
        let batches = batch_updates(bridge);
        match batches.last() {
            Some(OutboundMessage::BatchUpdate { updates, .. }) => updates
                .iter()
                .find(|u| u.path == path)
                .map(|u| u.data.clone())
                .expect("update path missing from batch"),
            _ => panic!("Expected a batch update"),
        }
    }

    fn color_edit(id: &str, index: usize, value: f64) -> EditEvent {
        EditEvent::edit(
            id,
            PropertyPath::from_iter([
                PathSegment::from("uniforms"),
                PathSegment::from("color"),
                PathSegment::from(index),
            ]),
            value,
        )
    }

    // ============================================================================
    // Registration
    // ============================================================================

    #[test]
    fn test_duplicate_registration_announces_once() {
        let mut bridge = bridge(unthrottled(), true);
        let first = register(&mut bridge, TestModel::new("m1", white()));
        let second = TestModel::shared("m1", ValueMap::new());
        let second: SharedRenderable = second;
        assert!(!bridge.register(&second));

        let announcements: Vec<_> = bridge
            .transport()
            .messages()
            .iter()
            .filter(|m| matches!(m, OutboundMessage::RegisterItem { .. }))
            .collect();
        assert_eq!(announcements.len(), 1);
        assert_eq!(
            announcements[0],
            &OutboundMessage::RegisterItem {
                namespace: "nethercore".to_string(),
                id: ModelId::from("m1"),
            }
        );

        let found = bridge.registry().lookup(&ModelId::from("m1")).unwrap();
        let first: SharedRenderable = first;
        assert!(Rc::ptr_eq(&found, &first));
    }

    // ============================================================================
    // Publishing
    // ============================================================================

    #[test]
    fn test_publish_merges_and_transforms() {
        let mut bridge = bridge(unthrottled(), true);
        let model = TestModel::new(
            "m1",
            value_map([
                ("alpha", Value::Number(1.0)),
                ("color", Value::numbers([1.0, 1.0, 1.0])),
            ]),
        )
        .with_geometry(value_map([
            ("positions", Value::Buffer(NumericBuffer::F32(vec![0.0, 1.0, 2.0]))),
            ("normals", Value::Buffer(NumericBuffer::F32(vec![0.0, 0.0, 1.0]))),
        ]))
        .with_attributes(value_map([(
            "normals",
            Value::Buffer(NumericBuffer::F64(vec![1.0, 0.0, 0.0])),
        )]));
        let model = register(&mut bridge, model);

        let extra = value_map([
            ("alpha", Value::Number(0.5)),
            ("time", Value::Function(HostFunction::new(|_| Value::Number(0.0)))),
        ]);
        assert!(bridge.publish(&*model.borrow(), &extra));

        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(
            uniforms,
            value_map([
                ("alpha", Value::Number(0.5)),
                ("color", Value::numbers([1.0, 1.0, 1.0])),
            ])
        );

        let attributes = last_published(&bridge, "objects.attributes");
        assert_eq!(
            attributes,
            value_map([
                ("normals", Value::numbers([1.0, 0.0, 0.0])),
                ("positions", Value::numbers([0.0, 1.0, 2.0])),
            ])
        );
    }

    #[test]
    fn test_publish_sends_single_batch_per_call() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));
        bridge.transport_mut().drain();

        bridge.publish(&*model.borrow(), &ValueMap::new());
        let messages = bridge.transport().messages();
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            OutboundMessage::BatchUpdate {
                namespace,
                id,
                updates,
            } => {
                assert_eq!(namespace, "nethercore");
                assert_eq!(id, &ModelId::from("m1"));
                let paths: Vec<_> = updates.iter().map(|u| u.path.as_str()).collect();
                assert_eq!(paths, ["objects.uniforms", "objects.attributes"]);
            }
            other => panic!("Expected batch update, got {:?}", other),
        }
    }

    #[test]
    fn test_publish_is_throttled_per_model() {
        let mut bridge = bridge(BridgeConfig::default(), true);
        let m1 = register(&mut bridge, TestModel::new("m1", white()));
        let m2 = register(&mut bridge, TestModel::new("m2", white()));

        assert!(bridge.publish(&*m1.borrow(), &ValueMap::new()));
        assert!(!bridge.publish(&*m1.borrow(), &ValueMap::new()));
        assert!(bridge.publish(&*m2.borrow(), &ValueMap::new()));

        assert_eq!(batch_updates(&bridge).len(), 2);
    }

    #[test]
    fn test_uninitialized_bridge_is_inert() {
        let mut bridge = bridge(unthrottled(), false);
        let model = register(&mut bridge, TestModel::new("m1", white()));

        assert!(!bridge.publish(&*model.borrow(), &ValueMap::new()));
        assert!(batch_updates(&bridge).is_empty());

        // The live edit still lands, but nothing is remembered for later snapshots
        assert!(bridge.ingest_edit(color_edit("m1", 0, 0.0)));
        assert_eq!(bridge.overrides().count(&ModelId::from("m1")), 0);
        assert_eq!(
            model.borrow().uniforms()["color"],
            Value::numbers([0.0, 1.0, 1.0])
        );
    }

    #[test]
    fn test_publish_registered_by_id() {
        let mut bridge = bridge(unthrottled(), true);
        let _model = register(&mut bridge, TestModel::new("m1", white()));

        assert!(bridge.publish_registered(&ModelId::from("m1"), &ValueMap::new()));
        assert!(!bridge.publish_registered(&ModelId::from("m9"), &ValueMap::new()));
        assert_eq!(batch_updates(&bridge).len(), 1);
    }

    // ============================================================================
    // Edits and overrides
    // ============================================================================

    #[test]
    fn test_edit_applies_live_and_survives_recomputed_uniforms() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));

        let accepted = bridge.handle_raw_message(
            "nethercore",
            r#"{"itemKey": "m1", "type": "edit", "valuePath": ["uniforms", "color", 0], "value": 0}"#,
        );
        assert!(accepted);
        assert_eq!(
            model.borrow().uniforms()["color"],
            Value::numbers([0.0, 1.0, 1.0])
        );
        assert_eq!(model.borrow().set_uniforms_calls, 1);

        // Render code recomputes uniforms from scratch and passes them per draw
        model.borrow_mut().uniforms = white();
        assert!(bridge.publish(&*model.borrow(), &white()));

        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(uniforms["color"], Value::numbers([0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_repeated_edits_keep_latest_value() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));

        bridge.ingest_edit(color_edit("m1", 1, 0.1));
        bridge.ingest_edit(color_edit("m1", 1, 0.2));
        assert_eq!(bridge.overrides().count(&ModelId::from("m1")), 1);

        bridge.publish(&*model.borrow(), &white());
        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(uniforms["color"], Value::numbers([1.0, 0.2, 1.0]));
    }

    #[test]
    fn test_edit_into_typed_buffer() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(
            &mut bridge,
            TestModel::new(
                "m1",
                value_map([("tint", Value::from(glam::Vec4::ONE))]),
            ),
        );

        let event = EditEvent::edit(
            "m1",
            PropertyPath::from_iter([
                PathSegment::from("uniforms"),
                PathSegment::from("tint"),
                PathSegment::from(3usize),
            ]),
            0.25,
        );
        assert!(bridge.ingest_edit(event));
        assert_eq!(
            model.borrow().uniforms()["tint"],
            Value::Buffer(NumericBuffer::F32(vec![1.0, 1.0, 1.0, 0.25]))
        );

        bridge.publish(&*model.borrow(), &ValueMap::new());
        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(uniforms["tint"], Value::numbers([1.0, 1.0, 1.0, 0.25]));
    }

    #[test]
    fn test_edit_with_missing_intermediate_is_soft() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));

        let event = EditEvent::edit(
            "m1",
            PropertyPath::from_segments(["uniforms", "material", "roughness"]),
            0.5,
        );
        assert!(bridge.ingest_edit(event));
        assert_eq!(model.borrow().uniforms(), &white());

        // Once the block exists, the stored override fills it in
        model.borrow_mut().uniforms = value_map([("material", Value::Map(ValueMap::new()))]);
        bridge.publish(&*model.borrow(), &ValueMap::new());
        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(
            uniforms["material"],
            Value::Map(value_map([("roughness", Value::Number(0.5))]))
        );
    }

    #[test]
    fn test_rejected_events() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));

        // Not an edit
        assert!(!bridge.handle_raw_message(
            "nethercore",
            r#"{"itemKey": "m1", "type": "select", "valuePath": ["uniforms", "color", 0], "value": 0}"#,
        ));
        // Outside uniforms
        assert!(!bridge.handle_raw_message(
            "nethercore",
            r#"{"itemKey": "m1", "type": "edit", "valuePath": ["attributes", "positions", 0], "value": 0}"#,
        ));
        // Bare uniforms root
        assert!(!bridge.handle_raw_message(
            "nethercore",
            r#"{"itemKey": "m1", "type": "edit", "valuePath": ["uniforms"], "value": 0}"#,
        ));
        // Unknown model
        assert!(!bridge.ingest_edit(color_edit("m2", 0, 0.0)));
        // Other namespace
        assert!(!bridge.handle_raw_message(
            "other",
            r#"{"itemKey": "m1", "type": "edit", "valuePath": ["uniforms", "color", 0], "value": 0}"#,
        ));
        // Malformed
        assert!(!bridge.handle_raw_message("nethercore", "{\"itemKey\":"));

        assert_eq!(model.borrow().uniforms(), &white());
        assert_eq!(model.borrow().set_uniforms_calls, 0);
        assert_eq!(bridge.overrides().model_count(), 0);
    }

    #[test]
    fn test_edit_for_dropped_model_is_ignored() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));
        drop(model);

        assert!(!bridge.ingest_edit(color_edit("m1", 0, 0.0)));
        assert_eq!(bridge.overrides().model_count(), 0);
    }

    #[test]
    fn test_edit_while_model_borrowed_is_kept_as_override() {
        let mut bridge = bridge(unthrottled(), true);
        let model = register(&mut bridge, TestModel::new("m1", white()));

        {
            let _frame = model.borrow_mut();
            assert!(bridge.ingest_edit(color_edit("m1", 2, 0.0)));
        }
        assert_eq!(model.borrow().uniforms(), &white());

        bridge.publish(&*model.borrow(), &ValueMap::new());
        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(uniforms["color"], Value::numbers([1.0, 1.0, 0.0]));
    }

    // ============================================================================
    // Unregistration
    // ============================================================================

    #[test]
    fn test_unregister_prunes_overrides() {
        let mut bridge = bridge(unthrottled(), true);
        let _model = register(&mut bridge, TestModel::new("m1", white()));
        bridge.ingest_edit(color_edit("m1", 0, 0.0));
        assert_eq!(bridge.overrides().count(&ModelId::from("m1")), 1);

        bridge.unregister(&ModelId::from("m1"));
        assert!(bridge.registry().is_empty());
        assert_eq!(bridge.overrides().model_count(), 0);

        // Unregistering again is a no-op
        bridge.unregister(&ModelId::from("m1"));
    }

    #[test]
    fn test_unregister_can_keep_overrides() {
        let config = BridgeConfig {
            prune_overrides_on_remove: false,
            ..unthrottled()
        };
        let mut bridge = bridge(config, true);
        let _model = register(&mut bridge, TestModel::new("m1", white()));
        bridge.ingest_edit(color_edit("m1", 0, 0.0));

        bridge.unregister(&ModelId::from("m1"));
        assert_eq!(bridge.overrides().count(&ModelId::from("m1")), 1);

        // A re-created model with the same id picks the override back up
        let model = register(&mut bridge, TestModel::new("m1", white()));
        bridge.publish(&*model.borrow(), &ValueMap::new());
        let uniforms = last_published(&bridge, "objects.uniforms");
        assert_eq!(uniforms["color"], Value::numbers([0.0, 1.0, 1.0]));
    }
}
