use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError, bounded};
use ridge_world::{Section, SectionSource, SeedSequence, TerrainConfig};
use thread_priority::{ThreadPriority, set_current_thread_priority};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub generated: u64,
    pub consumed: u64,
    /// Times the consumer found the queue empty and had to block.
    pub waits: u64,
    pub total_wait_us: u64,
    pub max_wait_us: u64,
    pub inline_fallbacks: u64,
    pub len: usize,
    pub capacity: usize,
}

#[derive(Default)]
struct ProducerCounters {
    generated: AtomicU64,
    generate_time_us: AtomicU64,
}

/// Bounded queue of pre-generated sections fed by one background thread.
///
/// Sections come out in the order their streams were issued, so a store
/// backed by this queue sees the same terrain as one generating inline.
pub struct GenerationQueue {
    config: Arc<TerrainConfig>,
    seeds: SeedSequence,
    rx: Receiver<Section>,
    shutdown: Arc<AtomicBool>,
    counters: Arc<ProducerCounters>,
    handle: Option<JoinHandle<()>>,
    consumed: u64,
    waits: u64,
    total_wait_us: u64,
    max_wait_us: u64,
    inline_fallbacks: u64,
}

impl GenerationQueue {
    pub fn spawn(config: Arc<TerrainConfig>) -> io::Result<Self> {
        Self::spawn_with_seeds(config, SeedSequence::new())
    }

    pub fn spawn_with_seeds(config: Arc<TerrainConfig>, seeds: SeedSequence) -> io::Result<Self> {
        let (tx, rx) = bounded(config.queue.capacity);
        let shutdown = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(ProducerCounters::default());

        let handle = {
            let config = Arc::clone(&config);
            let seeds = seeds.clone();
            let shutdown = Arc::clone(&shutdown);
            let counters = Arc::clone(&counters);
            thread::Builder::new()
                .name("ridge-sections".into())
                .spawn(move || run_producer(&config, &seeds, &tx, &shutdown, &counters))?
        };
        log::info!(
            target: "queue",
            "section producer started (capacity {}, seed {})",
            config.queue.capacity,
            config.seed
        );

        Ok(Self {
            config,
            seeds,
            rx,
            shutdown,
            counters,
            handle: Some(handle),
            consumed: 0,
            waits: 0,
            total_wait_us: 0,
            max_wait_us: 0,
            inline_fallbacks: 0,
        })
    }

    /// Sections ready to be taken.
    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.queue.capacity
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            generated: self.counters.generated.load(Ordering::Relaxed),
            consumed: self.consumed,
            waits: self.waits,
            total_wait_us: self.total_wait_us,
            max_wait_us: self.max_wait_us,
            inline_fallbacks: self.inline_fallbacks,
            len: self.len(),
            capacity: self.capacity(),
        }
    }

    /// Mean time the producer spends on one section, in microseconds.
    pub fn mean_generate_us(&self) -> u64 {
        let n = self.counters.generated.load(Ordering::Relaxed);
        if n == 0 {
            return 0;
        }
        self.counters.generate_time_us.load(Ordering::Relaxed) / n
    }

    /// Stops the producer and waits for it to exit. Queued sections can still
    /// be taken; after that, sections are generated inline.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!(target: "queue", "section producer panicked");
            }
            log::info!(
                target: "queue",
                "section producer joined after {} sections ({} consumed)",
                self.counters.generated.load(Ordering::Relaxed),
                self.consumed
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn take(&mut self, section: Section) -> Section {
        self.consumed += 1;
        section
    }

    fn generate_inline(&mut self) -> Section {
        if self.inline_fallbacks == 0 && self.handle.is_some() {
            log::warn!(
                target: "queue",
                "section producer is gone; generating sections on the query thread"
            );
        }
        self.inline_fallbacks += 1;
        let section = Section::generate(&self.config, self.seeds.next_stream());
        self.take(section)
    }
}

impl SectionSource for GenerationQueue {
    fn next_section(&mut self) -> Section {
        match self.rx.try_recv() {
            Ok(section) => return self.take(section),
            Err(TryRecvError::Disconnected) => return self.generate_inline(),
            Err(TryRecvError::Empty) => {}
        }

        let t0 = Instant::now();
        match self.rx.recv() {
            Ok(section) => {
                let us = t0.elapsed().as_micros().min(u128::from(u64::MAX)) as u64;
                self.waits += 1;
                self.total_wait_us += us;
                self.max_wait_us = self.max_wait_us.max(us);
                log::debug!(target: "queue", "section queue starved, waited {}us", us);
                self.take(section)
            }
            Err(_) => self.generate_inline(),
        }
    }
}

impl Drop for GenerationQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_producer(
    config: &TerrainConfig,
    seeds: &SeedSequence,
    tx: &Sender<Section>,
    shutdown: &AtomicBool,
    counters: &ProducerCounters,
) {
    lower_priority();
    let poll = Duration::from_millis(config.queue.poll_interval_ms.max(1));
    'produce: while !shutdown.load(Ordering::Acquire) {
        let mut section = Section::generate(config, seeds.next_stream());
        counters.generated.fetch_add(1, Ordering::Relaxed);
        counters
            .generate_time_us
            .fetch_add(u64::from(section.compute_time_us), Ordering::Relaxed);

        // Full queue: keep offering until there is room or we are told to stop
        loop {
            match tx.send_timeout(section, poll) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(s)) => {
                    if shutdown.load(Ordering::Acquire) {
                        break 'produce;
                    }
                    section = s;
                }
                Err(SendTimeoutError::Disconnected(_)) => break 'produce,
            }
        }
    }
}

/// Drops the calling thread to the lowest scheduling priority so generation
/// yields to the query thread. Returns whether the scheduler accepted it.
pub(crate) fn lower_priority() -> bool {
    match set_current_thread_priority(ThreadPriority::Min) {
        Ok(()) => true,
        Err(e) => {
            log::warn!(target: "queue", "could not lower section producer priority: {:?}", e);
            false
        }
    }
}
