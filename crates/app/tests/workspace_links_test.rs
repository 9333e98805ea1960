//! Checks that each layer's public API links into the binary crate.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use tickwatch_application::{ApplicationError, TimeStore};
use tickwatch_domain::{ClockConfig, LOCATIONS, SubscriptionState};
use tickwatch_infrastructure::socketio::socket_url;

#[test]
fn domain_defaults_are_usable() {
    assert!(ClockConfig::default().validate().is_ok());
    assert_eq!(LOCATIONS.len(), 5);
    assert_eq!(SubscriptionState::Closed.toggled(), SubscriptionState::Open);
}

#[test]
fn application_starts_empty() {
    let snapshot = TimeStore::new().snapshot();
    assert_eq!(snapshot.now, None);
    assert!(!snapshot.watching);
    assert!(ApplicationError::Timeout.is_transport());
}

#[test]
fn infrastructure_maps_the_default_server() {
    let url = socket_url(&ClockConfig::default().server_url).unwrap();
    assert_eq!(url.scheme(), "wss");
    assert_eq!(url.path(), "/socket.io/");
}
