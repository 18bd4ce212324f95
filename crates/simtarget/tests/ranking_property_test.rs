use proptest::prelude::*;
use simtarget::mcp::device_catalog::{Device, DeviceCatalog, DeviceState};
use simtarget::mcp::device_resolver::{ResolveCriteria, ResolverConfig, default_ranking, resolve};

struct FakeCatalog {
    devices: Vec<Device>,
}

impl DeviceCatalog for FakeCatalog {
    fn list(&self) -> simtarget::Result<Vec<Device>> {
        Ok(self.devices.clone())
    }
}

fn device_strategy() -> impl Strategy<Value = Device> {
    let id = "[0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12}";
    let name = prop_oneof![
        Just("iPhone 15".to_string()),
        Just("iPhone 15 Pro".to_string()),
        Just("iPad Air".to_string()),
        Just("Apple TV".to_string()),
    ];
    let version = prop_oneof![
        Just("16.4".to_string()),
        Just("17".to_string()),
        Just("17.0.1".to_string()),
        Just("17.2".to_string()),
        Just("beta".to_string()),
    ];
    let state = prop_oneof![
        Just(DeviceState::Shutdown),
        Just(DeviceState::Booted),
        Just(DeviceState::Booting),
    ];

    (id, name, version, state).prop_map(|(id, display_name, runtime_version, state)| Device {
        id,
        display_name,
        runtime_name: format!("iOS {}", runtime_version),
        runtime_version,
        runtime_available: true,
        state,
        available: true,
        availability_error: None,
    })
}

proptest! {
    // Selection is total: no device set ever produces an ambiguity, and
    // repeated resolution returns the same winner.
    #[test]
    fn resolution_is_deterministic(devices in prop::collection::vec(device_strategy(), 1..8)) {
        let catalog = FakeCatalog { devices };
        let criteria = ResolveCriteria::default();
        let config = ResolverConfig::default();

        let first = resolve(&criteria, None, &catalog, &config).unwrap();
        for _ in 0..3 {
            prop_assert_eq!(&first, &resolve(&criteria, None, &catalog, &config).unwrap());
        }
    }

    // The winner does not depend on catalog enumeration order.
    #[test]
    fn winner_is_order_independent(
        devices in prop::collection::vec(device_strategy(), 1..8),
        rotation in 0usize..8,
    ) {
        let criteria = ResolveCriteria::default();
        let config = ResolverConfig::default();

        let forward = resolve(
            &criteria,
            None,
            &FakeCatalog { devices: devices.clone() },
            &config,
        )
        .unwrap();

        let mut rotated = devices;
        let split = rotation % rotated.len();
        rotated.rotate_left(split);
        let after = resolve(&criteria, None, &FakeCatalog { devices: rotated }, &config).unwrap();

        prop_assert_eq!(forward, after);
    }

    // The comparator is antisymmetric over distinct devices, which is what
    // makes the id tie-break key load-bearing.
    #[test]
    fn ranking_is_antisymmetric(a in device_strategy(), b in device_strategy()) {
        prop_assume!(a.id != b.id);
        prop_assert_eq!(default_ranking(&a, &b), default_ranking(&b, &a).reverse());
    }
}
