//! Hot-plug state machine tests

mod common;

use std::sync::atomic::Ordering;

use proptest::prelude::*;

use tvout_api::{Error, HpdState, LayerId, LayerMask};
use tvout_core::config::HPD_QUEUE_DEPTH;
use tvout_core::{TvOut, TvOutConfig};

use common::{Ev, Rig, phy_never_precedes_gate, replug};

const ONLINE: &str = "HDMI_STATE=online";
const OFFLINE: &str = "HDMI_STATE=offline";

fn uevent(env: &str) -> Ev {
    Ev::Uevent(env.to_string())
}

#[test]
fn test_boot_sample_resolves_unknown() {
    let rig = Rig::new(true);
    let tvout = TvOut::probe(TvOutConfig::default(), rig.platform()).unwrap();
    assert_eq!(tvout.hpd_state(), HpdState::Unknown);

    assert_eq!(tvout.run_deferred_work(), Ok(1));
    assert_eq!(tvout.hpd_state(), HpdState::Connected);
    assert_eq!(rig.count(&uevent(ONLINE)), 1);
}

#[test]
fn test_disconnected_from_unknown_is_a_transition() {
    let rig = Rig::new(false);
    let tvout = TvOut::probe(TvOutConfig::default(), rig.platform()).unwrap();
    rig.clear();

    assert_eq!(tvout.run_deferred_work(), Ok(1));
    assert_eq!(tvout.hpd_state(), HpdState::Disconnected);
    assert_eq!(rig.events().first(), Some(&uevent(OFFLINE)));
    assert_eq!(tvout.stats().cascades, 1);

    // a second disconnected sample is debounced
    assert_eq!(replug(&rig, &tvout, false), Ok(0));
    assert_eq!(rig.count(&uevent(OFFLINE)), 1);
    assert_eq!(tvout.stats().debounced, 1);
}

#[test]
fn test_connect_cascade_order() {
    let rig = Rig::new(false);
    let tvout = rig.probe(TvOutConfig::default());
    tvout.output_open().unwrap();
    tvout.layer_open(0).unwrap();
    tvout.layer_open(2).unwrap();
    rig.clear();

    assert_eq!(replug(&rig, &tvout, true), Ok(1));
    rig.assert_order(&[
        uevent(ONLINE),
        Ev::Restrict,
        Ev::OutputStart,
        Ev::LayerStart(LayerId::Video),
        Ev::LayerStart(LayerId::Graphic1),
    ]);
    assert!(phy_never_precedes_gate(&rig.events()));

    let snap = tvout.snapshot();
    assert_eq!(snap.hpd, HpdState::Connected);
    assert!(snap.output_running);
    assert_eq!(snap.running_layers, LayerMask::VIDEO | LayerMask::GRAPHIC1);
}

#[test]
fn test_connect_powers_rail_clocks_then_phy() {
    let rig = Rig::new(false);
    let tvout = rig.probe(TvOutConfig::default());

    assert_eq!(replug(&rig, &tvout, true), Ok(1));
    rig.assert_order(&[
        uevent(ONLINE),
        Ev::Restrict,
        Ev::RailOn,
        Ev::DomainUp("vp_pd"),
        Ev::ClockOn("vp"),
        Ev::ClockOn("hdmi"),
        Ev::TvPower(true),
        Ev::ClockOn("i2c-hdmiphy"),
        Ev::PhyPower(true),
    ]);
    // nothing user-enabled to start
    assert_eq!(rig.count(&Ev::OutputStart), 0);
    assert!(phy_never_precedes_gate(&rig.events()));
}

#[test]
fn test_disconnect_keeps_intent() {
    let rig = Rig::new(true);
    let tvout = rig.probe(TvOutConfig::default());
    tvout.output_open().unwrap();
    tvout.layer_open(0).unwrap();
    tvout.layer_open(1).unwrap();
    let intent = tvout.snapshot().intent();
    rig.clear();

    assert_eq!(replug(&rig, &tvout, false), Ok(1));
    rig.assert_order(&[
        uevent(OFFLINE),
        Ev::LayerStop(LayerId::Video),
        Ev::LayerStop(LayerId::Graphic0),
        Ev::OutputStop,
        Ev::PhyPower(false),
        Ev::ClockOff("hdmi"),
        Ev::ClockOff("vp"),
        Ev::RailOff,
        Ev::Normal,
    ]);

    let snap = tvout.snapshot();
    assert_eq!(snap.intent(), intent);
    assert!(snap.running_layers.is_empty());
    assert!(!snap.output_running);
    assert!(!snap.rail_on && !snap.clocks_on && !snap.phy_on);

    // a transient pull restores the previous configuration
    rig.clear();
    assert_eq!(replug(&rig, &tvout, true), Ok(1));
    assert_eq!(rig.count(&Ev::LayerStart(LayerId::Video)), 1);
    assert_eq!(rig.count(&Ev::LayerStart(LayerId::Graphic0)), 1);
    let snap = tvout.snapshot();
    assert_eq!(snap.intent(), intent);
    assert_eq!(snap.running_layers, LayerMask::VIDEO | LayerMask::GRAPHIC0);
}

#[test]
fn test_freq_failure_is_not_fatal() {
    let rig = Rig::new(false);
    let tvout = rig.probe(TvOutConfig::default());
    rig.knobs.fail_restrict.store(true, Ordering::SeqCst);

    assert_eq!(replug(&rig, &tvout, true), Ok(1));
    assert_eq!(tvout.hpd_state(), HpdState::Connected);
    assert!(tvout.snapshot().phy_on);
}

#[test]
fn test_fatal_cascade_resets_state() {
    let rig = Rig::new(false);
    let tvout = rig.probe(TvOutConfig::default());
    rig.fail_domain(Some("mixer_pd"));

    let err = replug(&rig, &tvout, true).unwrap_err();
    assert_eq!(err, Error::ClockDomain { domain: "mixer_pd" });
    assert_eq!(tvout.hpd_state(), HpdState::Unknown);
    assert_eq!(rig.count(&Ev::PhyPower(true)), 0);
    assert_eq!(tvout.stats().failed_cascades, 1);

    // the next sample, even an identical one, retries the cascade
    rig.fail_domain(None);
    assert_eq!(replug(&rig, &tvout, true), Ok(1));
    assert_eq!(tvout.hpd_state(), HpdState::Connected);
    assert!(tvout.snapshot().phy_on);
}

#[test]
fn test_samples_ignored_while_suspending() {
    let rig = Rig::new(true);
    let tvout = rig.probe(TvOutConfig::default());
    tvout.output_open().unwrap();
    tvout.suspend().unwrap();
    rig.clear();

    assert_eq!(replug(&rig, &tvout, false), Ok(0));
    assert_eq!(replug(&rig, &tvout, true), Ok(0));
    assert!(rig.events().is_empty());
    assert_eq!(tvout.hpd_state(), HpdState::Connected);
    assert_eq!(tvout.stats().skipped_suspended, 2);
}

#[test]
fn test_queue_overflow_keeps_newest() {
    let rig = Rig::new(true);
    let tvout = rig.probe(TvOutConfig::default());

    let capacity = HPD_QUEUE_DEPTH - 1;
    for _ in 0..capacity {
        assert!(tvout.notify_cable_change());
    }
    rig.plug(false);
    assert!(!tvout.notify_cable_change());
    assert_eq!(tvout.stats().dropped_samples, 1);

    // the disconnect read last is still evaluated
    assert_eq!(tvout.run_deferred_work(), Ok(1));
    assert_eq!(tvout.hpd_state(), HpdState::Disconnected);
}

#[test]
fn test_hdcp_hook() {
    let rig = Rig::new(false);
    let tvout = rig.probe(TvOutConfig::default());
    tvout.set_hdcp(true);
    assert!(rig.events().is_empty());

    replug(&rig, &tvout, true).unwrap();
    rig.assert_order(&[Ev::PhyPower(true), Ev::HdcpAttach, Ev::HdcpHpd(true)]);

    rig.clear();
    replug(&rig, &tvout, false).unwrap();
    rig.assert_order(&[uevent(OFFLINE), Ev::HdcpDetach, Ev::HdcpHpd(false)]);

    // attached only once per connection
    rig.clear();
    replug(&rig, &tvout, true).unwrap();
    assert_eq!(rig.count(&Ev::HdcpAttach), 1);
}

#[test]
fn test_hdcp_not_requested() {
    let rig = Rig::new(false);
    let tvout = rig.probe(TvOutConfig::default());

    replug(&rig, &tvout, true).unwrap();
    replug(&rig, &tvout, false).unwrap();
    assert!(!rig.events().iter().any(|e| matches!(e, Ev::HdcpAttach | Ev::HdcpHpd(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repeated_reads_do_not_cascade(samples in proptest::collection::vec(any::<bool>(), 1..24)) {
        let rig = Rig::new(true);
        let tvout = rig.probe(TvOutConfig::default());
        tvout.output_open().unwrap();
        tvout.layer_open(0).unwrap();

        let mut recorded = true;
        let mut transitions = 0;
        let mut connects = 0;
        for connected in samples {
            let ran = replug(&rig, &tvout, connected).unwrap();
            if connected != recorded {
                prop_assert_eq!(ran, 1);
                transitions += 1;
                if connected {
                    connects += 1;
                }
                recorded = connected;
            } else {
                prop_assert_eq!(ran, 0);
            }
        }

        // one start from layer_open, then one per reconnect
        prop_assert_eq!(rig.count(&Ev::LayerStart(LayerId::Video)), 1 + connects);
        prop_assert_eq!(tvout.stats().cascades, 1 + transitions);
        prop_assert!(phy_never_precedes_gate(&rig.events()));
        prop_assert_eq!(tvout.snapshot().intent().1, LayerMask::VIDEO);
    }
}
