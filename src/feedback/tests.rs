use super::*;
use crate::session::CaptureMode;
use std::sync::Arc;

#[test]
fn test_model_lookup() {
    assert_eq!(DeviceModel::from_name("RICOH THETA Z1"), DeviceModel::ThetaZ1);
    assert_eq!(DeviceModel::from_name("RICOH THETA V"), DeviceModel::ThetaV);
    assert_eq!(
        DeviceModel::from_name("Pi Camera"),
        DeviceModel::Other("Pi Camera".to_string())
    );

    assert!(DeviceModel::ThetaZ1.capabilities().text_display);
    assert!(!DeviceModel::ThetaV.capabilities().text_display);
}

#[test]
fn test_text_display_shows_mode_words() {
    let sink = Arc::new(RecordingFeedback::new());
    let signal = FeedbackSignal::new(&DeviceModel::ThetaZ1, sink.clone());
    assert_eq!(signal.strategy(), IndicatorStrategy::TextDisplay);

    signal.show_mode(CaptureMode::Video);
    signal.show_mode(CaptureMode::Photo);

    assert_eq!(
        sink.calls(),
        vec![
            FeedbackCall::ShowText(TextArea::Bottom, "video".to_string()),
            FeedbackCall::ShowText(TextArea::Bottom, "image".to_string()),
        ]
    );
}

#[test]
fn test_leds_hide_other_lamp_first() {
    let sink = Arc::new(RecordingFeedback::new());
    let signal = FeedbackSignal::new(&DeviceModel::ThetaV, sink.clone());
    assert_eq!(signal.strategy(), IndicatorStrategy::Leds);

    signal.show_mode(CaptureMode::Video);
    assert_eq!(
        sink.calls(),
        vec![
            FeedbackCall::HideLed(LedTarget::Led4),
            FeedbackCall::ShowLed(LedTarget::Led5),
        ]
    );

    sink.clear();
    signal.show_mode(CaptureMode::Photo);
    assert_eq!(
        sink.calls(),
        vec![
            FeedbackCall::HideLed(LedTarget::Led5),
            FeedbackCall::ShowLed(LedTarget::Led4),
        ]
    );
}

#[test]
fn test_unknown_model_falls_back_to_leds() {
    let sink = Arc::new(RecordingFeedback::new());
    let signal = FeedbackSignal::new(&DeviceModel::from_name("bench rig"), sink.clone());

    signal.show_mode(CaptureMode::Photo);
    assert_eq!(sink.count(&FeedbackCall::ShowLed(LedTarget::Led4)), 1);
}
