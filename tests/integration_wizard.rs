//! Integration tests for wizard navigation over the in-process backend.

mod common;

use std::path::Path;

use autarky_wizard::components::{ComponentKey, EnabledComponentsPatch};
use autarky_wizard::config::SessionConfig;
use autarky_wizard::endpoints::Endpoint;
use autarky_wizard::stores::{ProjectPatch, SystemConfigPatch};
use autarky_wizard::wizard::{Navigation, Step, Wizard};

#[tokio::test]
async fn full_walk_posts_every_endpoint_in_order() {
    let mut wizard = Wizard::new(common::default_state(), common::RecordingBackend::default());

    let mut visited = vec![wizard.step()];
    loop {
        match wizard.next().await.unwrap() {
            Navigation::Moved(step) => visited.push(step),
            Navigation::Completed => break,
        }
    }

    assert_eq!(visited, Step::ALL.to_vec());
    assert!(wizard.is_completed());
    assert_eq!(wizard.backend().endpoints(), Endpoint::ALL.to_vec());
}

#[tokio::test]
async fn acknowledgements_echo_session_values() {
    let mut wizard = Wizard::new(common::default_state(), common::instant_backend());
    wizard.state_mut().project.update(&ProjectPatch {
        project_name: Some("Lamu".to_string()),
        ..ProjectPatch::default()
    });

    wizard.next().await.unwrap();
    let ack = wizard.last_acknowledgement().unwrap();
    assert_eq!(ack["success"], true);
    assert_eq!(ack["data"]["project_name"], "Lamu");

    wizard.next().await.unwrap();
    let ack = wizard.last_acknowledgement().unwrap();
    assert_eq!(ack["layout_id"], 1);
}

#[tokio::test]
async fn component_change_is_submitted_with_followed_layout() {
    let mut wizard = Wizard::new(common::default_state(), common::instant_backend());
    wizard.next().await.unwrap();

    wizard.state_mut().system.update(&SystemConfigPatch {
        enabled_components: Some(EnabledComponentsPatch::single(
            ComponentKey::DieselGenerator,
            true,
        )),
        ..SystemConfigPatch::default()
    });
    let layout_id = wizard.state().system.config().layout_id;
    assert!(
        wizard
            .state()
            .system
            .available_layouts()
            .iter()
            .any(|l| l.id == layout_id)
    );

    wizard.next().await.unwrap();
    assert_eq!(wizard.last_acknowledgement().unwrap()["layout_id"], layout_id);
}

#[tokio::test]
async fn back_then_next_resubmits_only_current_step() {
    let mut wizard = Wizard::new(common::default_state(), common::RecordingBackend::default());
    wizard.next().await.unwrap();
    wizard.next().await.unwrap();
    assert_eq!(wizard.back(), Step::SystemConfiguration);
    assert_eq!(wizard.back(), Step::ProjectSetup);
    assert_eq!(wizard.back(), Step::ProjectSetup);

    wizard.next().await.unwrap();
    assert_eq!(
        wizard.backend().endpoints(),
        vec![
            Endpoint::ProjectSetup,
            Endpoint::SystemConfiguration,
            Endpoint::ProjectSetup
        ]
    );
}

#[tokio::test]
async fn presets_walk_to_completion() {
    for name in SessionConfig::PRESETS {
        let state = SessionConfig::from_preset(name)
            .and_then(|c| c.build_state())
            .unwrap();
        let mut wizard = Wizard::new(state, common::instant_backend());
        for _ in 0..Step::COUNT {
            wizard.next().await.unwrap();
        }
        assert!(wizard.is_completed(), "preset {name} did not complete");
    }
}

#[tokio::test]
async fn csv_profile_is_submitted() {
    let mut state = common::default_state();
    state.load.load_csv_path(Path::new(common::LOAD_FIXTURE)).unwrap();
    let payload = state.load.payload();
    assert_eq!(payload.load_profile.timestep, vec![0, 1, 2, 3]);
    assert_eq!(payload.load_profile.series["summer"][3], 7.5);

    let ack = state
        .submit(Step::LoadDemand, &common::instant_backend())
        .await
        .unwrap();
    assert_eq!(ack["project_id"], "abc123");
}

#[test]
fn hybrid_selection_offers_layout_three() {
    let c = autarky_wizard::layouts::compatible_layouts(&common::hybrid_components());
    assert!(!c.fallback);
    assert!(c.layouts.iter().any(|l| l.id == 3));
}
