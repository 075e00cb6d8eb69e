//! # Analog Delay — A Stereo AU/VST3/CLAP Delay Plugin
//!
//! An analog-style stereo delay built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug). One circular delay
//! buffer per channel, fractional delay times with linear interpolation,
//! a feedback loop, and independent wet and dry levels.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────────── × dry ───┐
//!         │                                                      │
//!         │    ┌───────────────────────────────────────┐         │
//!         │    │            FEEDBACK LOOP              │         │
//!         └──►(+)──► [Ring Buffer / Delay Line] ───────┤         │
//!              ▲      (one per channel, read at a      │         │
//!              │       fractional delay)               │         │
//!              │                  │                    │         │
//!              │                  ▼                    │         │
//!              └─── × feedback ── delayed_sample       │         │
//!                                 │                    │         │
//!                                 └───── × wet ───────────────►(+)──► Output
//! ```
//!
//! ## Two threads, no locks
//!
//! The host changes parameters from its own threads while the audio thread
//! runs `process()`. Parameter changes land in a lock-free
//! [`SharedParameters`] store through nih-plug value-change callbacks (see
//! `params.rs`); `process()` takes one snapshot of that store per buffer
//! and hands it to the [`DelayEngine`]. Buffers are allocated only in
//! `initialize()`, never on the audio thread.
//!
//! The engine itself has no host dependency beyond logging, so it can be
//! driven directly:
//!
//! ```no_run
//! use analog_delay::{DelayEngine, DelayParameters};
//!
//! let mut engine = DelayEngine::default();
//! engine.configure(48000.0, 2000.0).unwrap();
//! engine.set_parameters(&DelayParameters::default());
//!
//! let mut out = [0.0; 2];
//! engine.process_frame(&[1.0, 1.0], &mut out);
//! ```

pub mod dsp;
pub mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;
use params::PluginParams;

pub use dsp::delay_line::DelayBuffer;
pub use dsp::engine::{DelayEngine, CHANNELS};
pub use dsp::lifecycle::{EngineConfig, EngineState};
pub use dsp::param_state::{DelayParameters, ParameterField, SharedParameters, MAX_DELAY_MS};
pub use error::ConfigureError;

/// Extra buffer beyond the longest settable delay, so 2000 ms does not
/// land on the `capacity - 1` clamp at any sample rate.
const DELAY_HEADROOM_MS: f32 = 100.0;

/// The plugin struct.
///
/// `params` is shared with the host (any thread may read or change it).
/// `engine` is owned by the audio thread and only touched in
/// `initialize()`, `reset()` and `process()`, which nih-plug never runs
/// concurrently.
struct AnalogDelay {
    params: Arc<PluginParams>,
    engine: DelayEngine,
}

impl Default for AnalogDelay {
    fn default() -> Self {
        let shared = Arc::new(SharedParameters::default());
        Self {
            params: Arc::new(PluginParams::new(Arc::clone(&shared))),
            // Unconfigured until initialize() tells us the sample rate.
            engine: DelayEngine::new(shared),
        }
    }
}

impl Plugin for AnalogDelay {
    const NAME: &'static str = "Analog Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most tracks are stereo. In mono the single
    // channel runs through the left lane of the engine.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate the delay buffers for the host's sample rate.
    ///
    /// Called while audio is stopped, so allocating here is fine. Returning
    /// `false` tells the host we can't run with this configuration.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let max_delay_ms = MAX_DELAY_MS + DELAY_HEADROOM_MS;
        if let Err(err) = self.engine.configure(buffer_config.sample_rate, max_delay_ms) {
            nih_error!("Cannot prepare the delay engine: {}", err);
            return false;
        }

        // Pick up values restored from a preset before the first buffer.
        self.params.publish_all();

        true
    }

    /// Transport stopped or the plugin was bypassed: drop any old echoes.
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Run the delay over one host buffer.
    ///
    /// One parameter snapshot covers the whole buffer, so every sample in
    /// it sees the same targets; the engine's smoothers glide between
    /// buffers.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let params = self.engine.parameters().snapshot();
        let mut outputs = [0.0; CHANNELS];

        for mut channel_samples in buffer.iter_samples() {
            let left = channel_samples.get_mut(0).map_or(0.0, |sample| *sample);
            // Mono layouts have no right channel; feed the left input twice.
            let right = channel_samples.get_mut(1).map_or(left, |sample| *sample);

            self.engine
                .process_frame_with(&params, &[left, right], &mut outputs);

            for (sample, output) in channel_samples.iter_mut().zip(outputs) {
                *sample = output;
            }
        }

        // Keep the host calling process() until the echoes have died away.
        ProcessStatus::Tail(self.engine.tail_samples(&params))
    }
}

impl ClapPlugin for AnalogDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.analog-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("An analog-style stereo delay with feedback and wet/dry levels");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for AnalogDelay {
    // 16 ASCII bytes; must never change once released.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssAnalogDly01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(AnalogDelay);
nih_export_vst3!(AnalogDelay);

// AUv2 entry point for Logic Pro, wrapping the CLAP export.
clap_wrapper::export_auv2!();
