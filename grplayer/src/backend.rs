//! Backend de lecture GStreamer.
//!
//! Un `playbin` unique vit de `init()` à `deinit()`. Chaque session de
//! lecture le réutilise : retour à READY, pose de l'URI, passage à
//! PLAYING. Deux threads applicatifs l'accompagnent : le watcher de bus
//! (EOS, erreurs, changements d'état, buffering) et le poller de
//! progression. Tous deux ne touchent que des atomiques et s'arrêtent
//! quand le drapeau `running` tombe.

use crate::mixer::HardwareMixer;
use crate::{PlayerBackend, PlayerError, PlayerOptions};
use gstreamer as gst;
use gstreamer::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Volume logiciel et latch de synchronisation matérielle.
#[derive(Debug)]
struct VolumeState {
    /// Pourcentage courant 0..100
    percent: u32,

    /// Vrai dès qu'un control point a modifié le volume ; relu au deinit
    /// pour décider d'écrire le volume logiciel vers le mixer matériel.
    changed_by_controller: bool,
}

/// Lecteur GStreamer (implémentation de [`PlayerBackend`]).
pub struct GstPlayer {
    playbin: gst::Element,
    mixer: HardwareMixer,

    playing: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    running: Arc<AtomicBool>,

    volume: Mutex<VolumeState>,

    bus_thread: Mutex<Option<JoinHandle<()>>>,
    progress_thread: Mutex<Option<JoinHandle<()>>>,
}

impl GstPlayer {
    /// Construit le pipeline et démarre les threads de surveillance.
    ///
    /// Si `initial_volume` vaut 0, le volume logiciel est semé depuis le
    /// mixer matériel ; sinon la valeur configurée est poussée vers le
    /// pipeline et sera persistée vers le matériel à l'arrêt.
    pub fn init(options: &PlayerOptions) -> Result<Self, PlayerError> {
        info!("Initializing player");

        gst::init().map_err(|e| PlayerError::Init(e.to_string()))?;
        let (major, minor, micro, nano) = gst::version();
        info!("GStreamer version: {major}.{minor}.{micro}.{nano}");

        let playbin = gst::ElementFactory::make("playbin")
            .name("player")
            .build()
            .map_err(|e| PlayerError::Init(format!("failed to create playbin: {e}")))?;

        // Sink audio ALSA nommé, avec buffer/latence configurés
        let audio_sink = gst::ElementFactory::make("alsasink")
            .name("audio-output")
            .property("device", &options.card)
            .property("buffer-time", options.buffer_time_us)
            .property("latency-time", options.latency_time_us)
            .build()
            .map_err(|e| PlayerError::Init(format!("failed to create alsasink: {e}")))?;
        playbin.set_property("audio-sink", &audio_sink);

        // Renderer audio-only : la vidéo part dans un fakesink
        let video_sink = gst::ElementFactory::make("fakesink")
            .build()
            .map_err(|e| PlayerError::Init(format!("failed to create fakesink: {e}")))?;
        playbin.set_property("video-sink", &video_sink);

        let mixer = HardwareMixer::new(&options.card, &options.selem_name);

        let mut initial_volume = options.initial_volume.min(100);
        let mut changed_by_controller = false;

        if initial_volume == 0 {
            mixer.list_controls();
            match mixer.get_volume() {
                Ok(hw) => {
                    initial_volume = hw.as_percent();
                    debug!(
                        "Current hardware volume: {} (range: {} ~ {}), software volume: {}%",
                        hw.value, hw.min, hw.max, initial_volume
                    );
                }
                Err(e) => error!("Failed to get hardware volume: {}", e),
            }
        } else {
            debug!("Current software volume: {}%", initial_volume);
            // Volume imposé par la configuration : à persister au deinit
            changed_by_controller = true;
        }
        playbin.set_property("volume", initial_volume as f64 / 100.0);

        let playing = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));

        let bus = playbin
            .bus()
            .ok_or_else(|| PlayerError::Init("pipeline has no bus".to_string()))?;

        let bus_thread = {
            let playbin = playbin.clone();
            let playing = Arc::clone(&playing);
            let paused = Arc::clone(&paused);
            let running = Arc::clone(&running);
            std::thread::spawn(move || run_bus_watch(bus, playbin, playing, paused, running))
        };

        let progress_thread = {
            let playbin = playbin.clone();
            let playing = Arc::clone(&playing);
            let paused = Arc::clone(&paused);
            let running = Arc::clone(&running);
            std::thread::spawn(move || run_progress_poller(playbin, playing, paused, running))
        };

        Ok(Self {
            playbin,
            mixer,
            playing,
            paused,
            running,
            volume: Mutex::new(VolumeState {
                percent: initial_volume,
                changed_by_controller,
            }),
            bus_thread: Mutex::new(Some(bus_thread)),
            progress_thread: Mutex::new(Some(progress_thread)),
        })
    }

    fn current_state(&self) -> gst::State {
        self.playbin.state(gst::ClockTime::ZERO).1
    }

    /// Arrête le pipeline, joint les threads et persiste le volume vers le
    /// mixer matériel si un control point l'a modifié.
    pub fn deinit(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Deinitializing player");

        let _ = self.stop();

        if let Some(handle) = self.progress_thread.lock().take() {
            if handle.join().is_err() {
                error!("progress poller panicked");
            }
        }
        if let Some(handle) = self.bus_thread.lock().take() {
            if handle.join().is_err() {
                error!("bus watcher panicked");
            }
        }

        if let Some(sink) = self.playbin.property::<Option<gst::Element>>("audio-sink") {
            let _ = sink.set_state(gst::State::Null);
        }

        let (percent, changed) = {
            let volume = self.volume.lock();
            (volume.percent, volume.changed_by_controller)
        };
        if changed {
            if let Err(e) = self.mixer.set_volume_all(percent as f64 / 100.0) {
                error!("Failed to persist volume to hardware mixer: {}", e);
            }
        }
    }
}

impl PlayerBackend for GstPlayer {
    fn play(&self, uri: &str) -> Result<(), PlayerError> {
        if self.current_state() != gst::State::Paused {
            if self.playbin.set_state(gst::State::Ready).is_err() {
                // Erreur non fatale : on tente quand même la lecture
                error!("setting READY state failed");
            }
            self.playbin.set_property("uri", uri);
        }

        self.playbin
            .set_state(gst::State::Playing)
            .map_err(|_| PlayerError::StateChange("PLAYING refused by pipeline".to_string()))?;

        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        if !self.playing.load(Ordering::SeqCst) {
            return Err(PlayerError::WrongState {
                action: "pause",
                reason: "not playing",
            });
        }

        debug!("Setting pipeline to PAUSED state");
        self.playbin
            .set_state(gst::State::Paused)
            .map_err(|_| PlayerError::StateChange("PAUSED refused by pipeline".to_string()))?;
        Ok(())
    }

    fn resume(&self) -> Result<(), PlayerError> {
        if !self.paused.load(Ordering::SeqCst) {
            return Err(PlayerError::WrongState {
                action: "resume",
                reason: "not paused",
            });
        }

        debug!("Setting pipeline to PLAYING state");
        self.playbin
            .set_state(gst::State::Playing)
            .map_err(|_| PlayerError::StateChange("PLAYING refused by pipeline".to_string()))?;
        Ok(())
    }

    fn stop(&self) -> Result<(), PlayerError> {
        debug!("Setting pipeline to NULL state");
        let _ = self.playbin.set_state(gst::State::Null);
        self.playing.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn seek(&self, seconds: u64) -> Result<(), PlayerError> {
        if !self.playing.load(Ordering::SeqCst) {
            return Err(PlayerError::WrongState {
                action: "seek",
                reason: "not playing",
            });
        }

        let position = gst::ClockTime::from_seconds(seconds);
        self.playbin
            .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT, position)
            .map_err(|_| PlayerError::SeekFailed { seconds })?;

        debug!("Seeking to position: {}", position);
        Ok(())
    }

    fn position(&self) -> (i64, i64) {
        let current = self
            .playbin
            .query_position::<gst::ClockTime>()
            .map(|t| t.seconds() as i64)
            .unwrap_or(-1);
        let total = self
            .playbin
            .query_duration::<gst::ClockTime>()
            .map(|t| t.seconds() as i64)
            .unwrap_or(-1);
        (current, total)
    }

    fn volume(&self) -> u32 {
        self.volume.lock().percent
    }

    fn set_volume(&self, percent: u32) -> Result<(), PlayerError> {
        let percent = percent.min(100);
        debug!("Setting volume: {}%", percent);

        {
            let mut volume = self.volume.lock();
            volume.percent = percent;
            volume.changed_by_controller = true;
        }

        self.playbin.set_property("volume", percent as f64 / 100.0);
        self.set_mute(percent == 0)?;
        Ok(())
    }

    fn mute(&self) -> bool {
        self.playbin.property::<bool>("mute")
    }

    fn set_mute(&self, mute: bool) -> Result<(), PlayerError> {
        info!("Set mute to {}", if mute { "on" } else { "off" });
        self.playbin.set_property("mute", mute);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst) && !self.paused.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Drop for GstPlayer {
    fn drop(&mut self) {
        self.deinit();
    }
}

/// Boucle du watcher de bus.
fn run_bus_watch(
    bus: gst::Bus,
    playbin: gst::Element,
    playing: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) {
    use gst::MessageView;

    debug!("bus watcher starting");

    while running.load(Ordering::SeqCst) {
        let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(100)) else {
            continue;
        };

        match msg.view() {
            MessageView::Eos(..) => {
                debug!("End of stream reached");
                playing.store(false, Ordering::SeqCst);
            }

            MessageView::Error(err) => {
                error!("GStreamer error: {}", err.error());
                if err.error().kind::<gst::ResourceError>().is_some() {
                    if let Some(uri) = playbin.property::<Option<String>>("uri") {
                        error!("Resource error on URI: {}", uri);
                    }
                }
                error!(
                    "Debug details: {}",
                    err.debug().unwrap_or_else(|| "none".into())
                );
                playing.store(false, Ordering::SeqCst);
            }

            MessageView::StateChanged(state_changed) => {
                // Seuls les changements d'état du pipeline lui-même comptent
                let from_pipeline = msg
                    .src()
                    .map(|s| *s == *playbin.upcast_ref::<gst::Object>())
                    .unwrap_or(false);
                if !from_pipeline {
                    continue;
                }

                debug!(
                    "State changed: {:?} -> {:?} (pending: {:?})",
                    state_changed.old(),
                    state_changed.current(),
                    state_changed.pending()
                );

                match state_changed.current() {
                    gst::State::Playing => {
                        log_audio_stream_info(&playbin);
                        playing.store(true, Ordering::SeqCst);
                        paused.store(false, Ordering::SeqCst);
                    }
                    gst::State::Paused => {
                        paused.store(true, Ordering::SeqCst);
                    }
                    gst::State::Null => {
                        playing.store(false, Ordering::SeqCst);
                    }
                    _ => {}
                }
            }

            MessageView::Buffering(buffering) => {
                // Flux réseau : observé et loggé, pas de pause automatique
                debug!("Buffering: {}%", buffering.percent());
            }

            MessageView::StreamStart(..) => {
                debug!("Stream started");
            }

            _ => {}
        }
    }

    debug!("bus watcher exiting");
}

/// Boucle du poller de progression (1 Hz pendant la lecture).
fn run_progress_poller(
    playbin: gst::Element,
    playing: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) {
    debug!("progress poller starting");

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_secs(1));

        if paused.load(Ordering::SeqCst) {
            continue;
        }
        if playing.load(Ordering::SeqCst) {
            if let Some(position) = playbin.query_position::<gst::ClockTime>() {
                info!("Current position: {}", position);
            }
        }
    }

    debug!("progress poller exiting");
}

/// Logge les caps négociées sur le pad du sink audio.
fn log_audio_stream_info(playbin: &gst::Element) {
    let Some(audio_sink) = playbin.property::<Option<gst::Element>>("audio-sink") else {
        warn!("audio-sink not available");
        return;
    };

    let Some(sinkpad) = audio_sink.static_pad("sink") else {
        warn!("audio-sink pad not found");
        return;
    };

    let Some(caps) = sinkpad.current_caps() else {
        debug!("No caps available on pad (likely not negotiated yet)");
        return;
    };

    let Some(structure) = caps.structure(0) else {
        return;
    };

    let media_type = structure.name();
    let format = structure.get::<&str>("format").unwrap_or("N/A");
    let rate = structure.get::<i32>("rate").unwrap_or(0);
    let channels = structure.get::<i32>("channels").unwrap_or(0);

    info!("Media Type: {}", media_type);
    info!("Format:     {}", format);
    info!("SampleRate: {} Hz", rate);
    info!("Channels:   {}", channels);
}
