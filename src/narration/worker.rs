use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error, warn};

use super::{
    player::Player, NarrationError, NarrationEvent, Narrator, SynthesisRequest, Synthesizer,
    Utterance,
};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

enum Job {
    Speak { utterance: Utterance, model: PathBuf },
    Shutdown,
}

/// [`Narrator`] backed by Piper synthesis and rodio playback on a dedicated
/// thread.
///
/// Events are handed to the `notify` callback from the worker thread; the
/// callback is expected to forward them to whichever thread owns the reader.
/// `cancel_all` raises a shared high-water mark, and the worker drops every
/// utterance at or below it, stopping playback mid-clip if needed.
pub struct PiperNarrator {
    jobs: Sender<Job>,
    cancelled_through: Arc<AtomicU64>,
    last_submitted: u64,
    voice: Option<PathBuf>,
    worker: Option<JoinHandle<()>>,
}

impl PiperNarrator {
    pub fn spawn<S, F>(
        synthesizer: S,
        voice: Option<PathBuf>,
        output_dir: PathBuf,
        notify: F,
    ) -> Result<Self, NarrationError>
    where
        S: Synthesizer + 'static,
        F: Fn(NarrationEvent) + Send + 'static,
    {
        let (jobs, inbox) = mpsc::channel();
        let cancelled_through = Arc::new(AtomicU64::new(0));
        let worker = Worker {
            synthesizer,
            output_dir,
            cancelled_through: Arc::clone(&cancelled_through),
            notify,
        };
        let handle = thread::Builder::new()
            .name("narration".into())
            .spawn(move || worker.run(inbox))
            .map_err(|err| NarrationError::Unavailable(err.to_string()))?;

        Ok(Self {
            jobs,
            cancelled_through,
            last_submitted: 0,
            voice,
            worker: Some(handle),
        })
    }
}

impl Narrator for PiperNarrator {
    fn submit(&mut self, utterance: Utterance) -> Result<(), NarrationError> {
        let Some(model) = self.voice.clone() else {
            return Err(NarrationError::Unavailable(format!(
                "no voice installed for locale {}",
                utterance.config.locale
            )));
        };
        self.last_submitted = utterance.seq;
        self.jobs
            .send(Job::Speak { utterance, model })
            .map_err(|_| NarrationError::Unavailable("narration worker stopped".into()))
    }

    fn cancel_all(&mut self) {
        self.cancelled_through
            .fetch_max(self.last_submitted, Ordering::SeqCst);
    }
}

impl Drop for PiperNarrator {
    fn drop(&mut self) {
        self.cancelled_through.store(u64::MAX, Ordering::SeqCst);
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Narration worker panicked");
            }
        }
    }
}

struct Worker<S, F> {
    synthesizer: S,
    output_dir: PathBuf,
    cancelled_through: Arc<AtomicU64>,
    notify: F,
}

impl<S, F> Worker<S, F>
where
    S: Synthesizer,
    F: Fn(NarrationEvent),
{
    fn run(self, inbox: Receiver<Job>) {
        let mut player: Option<Player> = None;
        while let Ok(job) = inbox.recv() {
            match job {
                Job::Speak { utterance, model } => self.speak(&mut player, &utterance, &model),
                Job::Shutdown => break,
            }
        }
        debug!("Narration worker stopped");
    }

    fn is_cancelled(&self, seq: u64) -> bool {
        self.cancelled_through.load(Ordering::SeqCst) >= seq
    }

    fn report(&self, event: NarrationEvent) {
        if !self.is_cancelled(event.seq()) {
            (self.notify)(event);
        }
    }

    fn fail(&self, seq: u64, message: String) {
        warn!("Utterance {seq} failed: {message}");
        self.report(NarrationEvent::Failed { seq, message });
    }

    fn speak(&self, player: &mut Option<Player>, utterance: &Utterance, model: &Path) {
        let seq = utterance.seq;
        if self.is_cancelled(seq) {
            return;
        }

        let output = self.output_dir.join(format!("utterance-{seq}.wav"));
        let request = SynthesisRequest::new(&utterance.text, model, output, utterance.config.rate);
        if let Err(err) = self.synthesizer.synthesize(&request) {
            self.fail(seq, err.to_string());
            return;
        }
        if self.is_cancelled(seq) {
            let _ = fs::remove_file(&request.output_path);
            return;
        }

        if player.is_none() {
            match Player::open() {
                Ok(opened) => *player = Some(opened),
                Err(err) => {
                    self.fail(seq, err.to_string());
                    let _ = fs::remove_file(&request.output_path);
                    return;
                }
            }
        }
        let Some(player) = player.as_mut() else {
            return;
        };

        match player.play(&request.output_path) {
            Ok(()) => {
                self.report(NarrationEvent::Started(seq));
                loop {
                    thread::sleep(POLL_INTERVAL);
                    if self.is_cancelled(seq) {
                        player.stop();
                        break;
                    }
                    if !player.is_playing() {
                        self.report(NarrationEvent::Ended(seq));
                        break;
                    }
                }
            }
            Err(err) => self.fail(seq, err.to_string()),
        }
        let _ = fs::remove_file(&request.output_path);
    }
}
