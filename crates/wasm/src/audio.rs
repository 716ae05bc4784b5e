use stellar_protocol::ToneSpec;
use wasm_bindgen::JsValue;
use web_sys::AudioContext;

/// Play a falling tone through a fresh `AudioContext`.
pub fn play(tone: &ToneSpec) -> Result<(), JsValue> {
    let ctx = AudioContext::new()?;
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    let start = ctx.current_time();
    let end = start + tone.duration_secs;
    let frequency = oscillator.frequency();
    frequency.set_value_at_time(tone.start_hz as f32, start)?;
    frequency.exponential_ramp_to_value_at_time(tone.end_hz as f32, end)?;
    let volume = gain.gain();
    volume.set_value_at_time(tone.start_gain as f32, start)?;
    volume.exponential_ramp_to_value_at_time(tone.end_gain as f32, end)?;

    oscillator.start()?;
    oscillator.stop_with_when(end)?;
    Ok(())
}
