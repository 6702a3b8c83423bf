use proptest::prelude::*;
use windfarm_sim::devices::battery::update;
use windfarm_sim::devices::wind_farm::wind_power_curve;
use windfarm_sim::sim::allocator::allocate;
use windfarm_sim::sim::types::SimulationConfig;

fn config() -> SimulationConfig {
    SimulationConfig::default()
}

proptest! {
    #[test]
    fn allocation_never_produces_negative_or_mixed_flows(
        net in -500.0f64..500.0,
        battery in 30.0f64..=270.0,
    ) {
        let flows = allocate(net, battery, &config());
        prop_assert!(flows.to_battery_mw >= 0.0);
        prop_assert!(flows.from_battery_mw >= 0.0);
        prop_assert!(flows.to_grid_mw >= 0.0);
        prop_assert!(flows.from_grid_mw >= 0.0);
        prop_assert!(!(flows.to_battery_mw > 0.0 && flows.from_battery_mw > 0.0));
        prop_assert!(!(flows.to_grid_mw > 0.0 && flows.from_grid_mw > 0.0));
    }

    #[test]
    fn allocation_routes_the_whole_balance(
        net in -500.0f64..500.0,
        battery in 30.0f64..=270.0,
    ) {
        let flows = allocate(net, battery, &config());
        prop_assert!((flows.net_mw() - net).abs() < 1e-9);
    }

    #[test]
    fn allocation_respects_rate_limits(
        net in -500.0f64..500.0,
        battery in 30.0f64..=270.0,
    ) {
        let cfg = config();
        let flows = allocate(net, battery, &cfg);
        prop_assert!(flows.to_battery_mw <= cfg.battery_max_charge_mw);
        prop_assert!(flows.from_battery_mw <= cfg.battery_max_discharge_mw);
        prop_assert!(flows.to_battery_mw <= cfg.battery_ceiling_mwh() - battery + 1e-9);
        prop_assert!(flows.from_battery_mw <= battery - cfg.battery_floor_mwh() + 1e-9);
    }

    #[test]
    fn update_stays_within_floor_and_ceiling(
        current in 0.0f64..400.0,
        to_battery in 0.0f64..200.0,
        from_battery in 0.0f64..200.0,
        efficiency in 0.5f64..=1.0,
    ) {
        let next = update(current, to_battery, from_battery, efficiency, 0.1, 0.9, 300.0);
        prop_assert!((30.0..=270.0).contains(&next));
    }

    #[test]
    fn allocated_hour_keeps_battery_in_bounds(
        net in -500.0f64..500.0,
        battery in 30.0f64..=270.0,
    ) {
        let cfg = config();
        let flows = allocate(net, battery, &cfg);
        let next = update(
            battery,
            flows.to_battery_mw,
            flows.from_battery_mw,
            cfg.battery_efficiency,
            cfg.battery_min_soc,
            cfg.battery_max_soc,
            cfg.battery_capacity_mwh,
        );
        prop_assert!(next >= cfg.battery_floor_mwh() && next <= cfg.battery_ceiling_mwh());
    }

    #[test]
    fn power_curve_is_a_fraction(speed in -5.0f64..40.0) {
        let fraction = wind_power_curve(speed);
        prop_assert!((0.0..=1.0).contains(&fraction));
    }
}
