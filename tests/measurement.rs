use ebd_mini_rs::calibration::{
    high_gain_code_to_mv, low_gain_code_to_mv, power_mw, shunt_code_to_ma, ADC_MAX_CODE,
    HIGH_GAIN_THRESHOLD_MV,
};
use ebd_mini_rs::measurement::{derive, derive_from_means};
use ebd_mini_rs::sampler::Sampler;

#[test]
fn shunt_conversion_truncates() {
    // 147 * 68 / 20 = 499.8
    assert_eq!(shunt_code_to_ma(147), 499);
    assert_eq!(shunt_code_to_ma(0), 0);
    assert_eq!(shunt_code_to_ma(ADC_MAX_CODE), 3478);
}

#[test]
fn voltage_conversions() {
    assert_eq!(low_gain_code_to_mv(300), 6000);
    assert_eq!(low_gain_code_to_mv(ADC_MAX_CODE), 20_460);
    // 800 * 65 / 10 - 20
    assert_eq!(high_gain_code_to_mv(800), 5180);
    assert_eq!(high_gain_code_to_mv(ADC_MAX_CODE), 6629);
}

#[test]
fn high_gain_offset_saturates_at_zero() {
    assert_eq!(high_gain_code_to_mv(0), 0);
    assert_eq!(high_gain_code_to_mv(3), 0);
    assert_eq!(high_gain_code_to_mv(4), 6);
}

#[test]
fn gain_boundary_is_inclusive() {
    // Low gain exactly at 6000 mV selects the high-gain reading.
    let at = derive_from_means(0, 300, 900);
    assert_eq!(low_gain_code_to_mv(300), HIGH_GAIN_THRESHOLD_MV);
    assert!(at.using_high_gain);
    assert_eq!(at.voltage_mv, high_gain_code_to_mv(900));

    let above = derive_from_means(0, 301, 900);
    assert!(!above.using_high_gain);
    assert_eq!(above.voltage_mv, 6020);
}

#[test]
fn boundary_oscillation_flips_between_stages() {
    // A source dithering across 6 V reports two independent figures on alternate cycles.
    let readings: Vec<_> = [300u16, 301, 300, 301]
        .iter()
        .map(|&low| derive_from_means(0, low, 930))
        .collect();
    assert_eq!(readings[0].voltage_mv, 6025);
    assert_eq!(readings[1].voltage_mv, 6020);
    assert!(readings[0].using_high_gain && readings[2].using_high_gain);
    assert!(!readings[1].using_high_gain && !readings[3].using_high_gain);
}

#[test]
fn power_is_truncated_milliwatts() {
    assert_eq!(power_mw(1003, 5231), 5246);
    assert_eq!(power_mw(3478, 20_460), 71_159);

    let m = derive_from_means(442, 500, 0);
    assert_eq!(m.current_ma, 1502);
    assert_eq!(m.voltage_mv, 10_000);
    assert_eq!(m.power_mw, 15_020);
}

#[test]
fn derive_uses_sampler_averages() {
    let mut sampler = Sampler::<4>::new();
    for _ in 0..4 {
        sampler.record(147, 500, 0);
    }
    let m = derive(&sampler);
    assert_eq!(m.current_ma, 499);
    assert_eq!(m.voltage_mv, 10_000);
    assert!(!m.using_high_gain);

    sampler.record(0, 0, 0);
    // (3 * 147) / 4 = 110
    assert_eq!(derive(&sampler).current_ma, shunt_code_to_ma(110));
}
