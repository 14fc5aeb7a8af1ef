use super::*;

#[test]
fn test_resolution_pixels() {
    assert_eq!(ShadowResolution::Low.pixels(), 512);
    assert_eq!(ShadowResolution::Medium.pixels(), 1024);
    assert_eq!(ShadowResolution::default().pixels(), 2048);
    assert_eq!(ShadowResolution::VeryHigh.pixels(), 4096);
}

#[test]
fn test_cascade_counts() {
    assert_eq!(CascadeCount::One.count(), 1);
    assert_eq!(CascadeCount::Two.count(), 2);
    assert_eq!(CascadeCount::Four.count(), 4);
}

#[test]
fn test_light_type_dispatch() {
    assert_eq!(Light::directional(1, Mat4::IDENTITY, CascadeCount::Two).light_type(), LightType::Directional);
    assert_eq!(Light::spot(2, Mat4::IDENTITY, 10.0, 0.5).light_type(), LightType::Spot);
    assert_eq!(Light::point(3, Vec3::ONE, 5.0).light_type(), LightType::Point);
}

#[test]
fn test_point_position() {
    let light = Light::point(3, Vec3::new(1.0, 2.0, 3.0), 5.0);
    assert_eq!(light.position(), Vec3::new(1.0, 2.0, 3.0));
    assert!(light.cast_shadows);
}

#[test]
fn test_direction_is_negative_local_z() {
    let light = Light::spot(1, Mat4::IDENTITY, 10.0, 0.5);
    assert_eq!(light.direction(), Vec3::NEG_Z);

    let turned = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let light = Light::spot(1, turned, 10.0, 0.5);
    assert!((light.direction() - Vec3::NEG_X).length() < 1e-5);
}

#[test]
fn test_builders() {
    let light = Light::spot(1, Mat4::IDENTITY, 10.0, 0.5)
        .with_shadows(false)
        .with_resolution(ShadowResolution::Low)
        .with_bias(ShadowBias { depth: 0.01, normal: 1.0 });
    assert!(!light.cast_shadows);
    assert_eq!(light.resolution, ShadowResolution::Low);
    assert_eq!(light.bias.normal, 1.0);
}
