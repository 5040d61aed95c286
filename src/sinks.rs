//! Fire-and-forget side-effect sinks for fired alarms: desktop notification,
//! synthesized alert tone, spoken announcement. Each dispatch runs on a
//! short-lived detached thread so the tick loop never blocks on D-Bus, the
//! audio device or a TTS process; failures are logged and otherwise ignored.

use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};
use notify_rust::Notification;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStreamBuilder, Sink};

const SAMPLE_RATE: u32 = 44_100;

/// Three rising sine bursts: frequency, start offset and length in seconds.
const TONE_SEQUENCE: [(f32, f32, f32); 3] = [
    (440.0, 0.0, 0.3),
    (550.0, 0.4, 0.3),
    (660.0, 0.8, 0.3),
];
const TONE_PEAK_GAIN: f32 = 0.3;
const TONE_FLOOR_GAIN: f32 = 0.01;

/// TTS commands to try in order, male-labeled voices first, then whatever
/// the platform default is.
const SPEECH_COMMANDS: &[(&str, &[&str])] = &[
    ("spd-say", &["-t", "male1"]),
    ("espeak-ng", &["-v", "en+m3"]),
    ("espeak", &["-v", "en+m3"]),
    ("say", &["-v", "Daniel"]),
    ("spd-say", &[]),
    ("say", &[]),
];

/// The three side effects a fired alarm dispatches. The lifecycle updater
/// only depends on this trait, so tests substitute a recording
/// implementation.
pub trait AlertSinks {
    fn notify(&self, title: &str, body: &str);
    fn alert(&self);
    fn announce(&self, message: &str);
}

/// Production sinks wired to the desktop.
pub struct DesktopSinks {
    sound_enabled: bool,
    speech_enabled: bool,
}

impl DesktopSinks {
    pub fn new(sound_enabled: bool, speech_enabled: bool) -> Self {
        Self {
            sound_enabled,
            speech_enabled,
        }
    }
}

impl AlertSinks for DesktopSinks {
    fn notify(&self, title: &str, body: &str) {
        let title = title.to_string();
        let body = body.to_string();
        thread::spawn(move || {
            debug!("notification: {title}: {body}");
            if let Err(err) = Notification::new()
                .summary(&title)
                .body(&body)
                .appname("zeno")
                .icon("alarm-clock")
                .show()
            {
                warn!("failed to show notification: {err}");
            }
        });
    }

    fn alert(&self) {
        if !self.sound_enabled {
            return;
        }
        thread::spawn(|| {
            if let Err(err) = play_alert_tone() {
                warn!("failed to play alert tone: {err}");
            }
        });
    }

    fn announce(&self, message: &str) {
        if !self.speech_enabled {
            return;
        }
        let message = message.to_string();
        thread::spawn(move || speak(&message));
    }
}

fn play_alert_tone() -> anyhow::Result<()> {
    let samples = render_alert_tone();
    let stream = OutputStreamBuilder::open_default_stream()?;
    let sink = Sink::connect_new(stream.mixer());
    sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
    // keep the stream alive until playback finishes
    sink.sleep_until_end();
    Ok(())
}

/// Renders the alert as one mono f32 buffer: each burst is a sine wave with
/// an exponential decay from the peak gain down to the floor.
fn render_alert_tone() -> Vec<f32> {
    let total_seconds = TONE_SEQUENCE
        .iter()
        .map(|(_, start, length)| start + length)
        .fold(0.0_f32, f32::max);
    let mut samples = vec![0.0_f32; (total_seconds * SAMPLE_RATE as f32).ceil() as usize];

    for (frequency, start, length) in TONE_SEQUENCE {
        let first = (start * SAMPLE_RATE as f32) as usize;
        let count = (length * SAMPLE_RATE as f32) as usize;
        let decay = TONE_FLOOR_GAIN / TONE_PEAK_GAIN;
        for offset in 0..count {
            let t = offset as f32 / SAMPLE_RATE as f32;
            let gain = TONE_PEAK_GAIN * decay.powf(t / length);
            let phase = 2.0 * std::f32::consts::PI * frequency * t;
            if let Some(sample) = samples.get_mut(first + offset) {
                *sample += gain * phase.sin();
            }
        }
    }
    samples
}

/// Spawns the first available TTS command, detached with null stdio.
fn speak(message: &str) {
    for (program, args) in SPEECH_COMMANDS {
        let spawned = Command::new(program)
            .args(*args)
            .arg(message)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if spawned.is_ok() {
            debug!("speaking via {program}");
            return;
        }
    }
    warn!("no TTS command available; skipping announcement");
}
