use rodio::source::{Buffered, SineWave};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::game::SoundEvent;

/// Where `<name>.wav` sound files are looked up
pub const SOUNDS_DIR: &str = "assets/sounds";

/// Requests beyond this many pending are dropped
const QUEUE_DEPTH: usize = 32;

type Clip = Buffered<Decoder<BufReader<File>>>;

/// Plays sound effects on a worker thread so the game loop never waits on
/// the audio device
pub struct AudioManager {
    sender: Option<SyncSender<SoundEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl AudioManager {
    /// Start the audio worker. `volume` is 0.0 to 1.0.
    pub fn new(volume: f32) -> Self {
        let (sender, receiver) = mpsc::sync_channel(QUEUE_DEPTH);
        let spawned = thread::Builder::new()
            .name("audio".into())
            .spawn(move || run_worker(receiver, volume));

        match spawned {
            Ok(worker) => Self {
                sender: Some(sender),
                worker: Some(worker),
            },
            Err(err) => {
                log::warn!("Failed to start audio thread: {err}");
                Self::muted()
            }
        }
    }

    /// A manager that ignores every request
    pub fn muted() -> Self {
        Self {
            sender: None,
            worker: None,
        }
    }

    /// Queue a sound. Never blocks; the request is dropped if the queue is
    /// full or the worker has stopped.
    pub fn play(&self, sound: SoundEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(sound);
        }
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(receiver: Receiver<SoundEvent>, volume: f32) {
    // The stream is not Send, so it lives and dies on this thread
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(err) => {
            log::warn!("Audio device unavailable ({err}), continuing without sound");
            for _ in receiver {}
            return;
        }
    };

    let bank = SoundBank::load(Path::new(SOUNDS_DIR));
    for sound in receiver {
        bank.play(&handle, sound, volume);
    }
}

/// Decoded sound files, with synthesized tones for any that are missing
struct SoundBank {
    clips: HashMap<SoundEvent, Clip>,
}

impl SoundBank {
    fn load(dir: &Path) -> Self {
        let mut clips = HashMap::new();
        for sound in SoundEvent::ALL {
            let path = dir.join(format!("{}.wav", sound.name()));
            match load_clip(&path) {
                Ok(clip) => {
                    clips.insert(sound, clip);
                }
                Err(err) => log::debug!("Using a tone for {}: {err}", sound.name()),
            }
        }
        Self { clips }
    }

    fn play(&self, handle: &OutputStreamHandle, sound: SoundEvent, volume: f32) {
        // Playback errors are not worth interrupting the game for
        let Ok(sink) = Sink::try_new(handle) else {
            return;
        };
        sink.set_volume(volume);
        match self.clips.get(&sound) {
            Some(clip) => sink.append(clip.clone()),
            None => {
                let (frequency, millis) = tone(sound);
                sink.append(
                    SineWave::new(frequency)
                        .take_duration(Duration::from_millis(millis))
                        .amplify(0.25),
                );
            }
        }
        sink.detach();
    }
}

fn load_clip(path: &Path) -> color_eyre::Result<Clip> {
    let file = File::open(path)?;
    let source = Decoder::new(BufReader::new(file))?;
    Ok(source.buffered())
}

/// Frequency in Hz and length in milliseconds of the fallback tone
fn tone(sound: SoundEvent) -> (f32, u64) {
    match sound {
        SoundEvent::Shot => (880.0, 60),
        SoundEvent::Hit => (440.0, 90),
        SoundEvent::Explosion => (110.0, 300),
        SoundEvent::Bomb => (220.0, 80),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_manager_ignores_requests() {
        let audio = AudioManager::muted();
        for sound in SoundEvent::ALL {
            audio.play(sound);
        }
    }

    #[test]
    fn test_play_does_not_block_on_full_queue() {
        let (sender, _receiver) = mpsc::sync_channel(1);
        let audio = AudioManager {
            sender: Some(sender),
            worker: None,
        };
        // Nobody drains the queue; every request past the first is dropped
        for _ in 0..10 {
            audio.play(SoundEvent::Shot);
        }
    }

    #[test]
    fn test_play_after_worker_exit() {
        let (sender, receiver) = mpsc::sync_channel(4);
        drop(receiver);
        let audio = AudioManager {
            sender: Some(sender),
            worker: None,
        };
        audio.play(SoundEvent::Explosion);
    }

    #[test]
    fn test_missing_files_fall_back_to_tones() {
        let bank = SoundBank::load(Path::new("no/such/dir"));
        assert!(bank.clips.is_empty());
        assert!(SoundEvent::ALL.iter().all(|&s| tone(s).0 > 0.0));
    }
}
