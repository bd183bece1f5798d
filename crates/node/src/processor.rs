#![warn(missing_docs)]

//! Processor of a chord node: owns a swarm and drives its periodic protocol steps.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::logging::init_logging;
use crate::prelude::Chord;
use crate::prelude::ChordStorage;
use crate::prelude::Did;
use crate::prelude::FixFingersMode;
use crate::prelude::PeerRing;
use crate::prelude::Stabilizer;
use crate::prelude::Swarm;
use crate::prelude::SwarmInspect;

/// ProcessorBuilder is used to initialize a [Processor] instance.
pub struct ProcessorBuilder {
    config: Config,
}

/// Processor of a chord node.
///
/// All members live in one [Swarm]. The first member seeds the ring and every
/// later member joins through it. Once started, each member runs one stabilize
/// task and one fix-fingers task until [Processor::stop] is called.
#[derive(Clone)]
pub struct Processor {
    /// a swarm instance
    pub swarm: Arc<Swarm>,
    seed: Arc<PeerRing>,
    stabilize_interval: Duration,
    fix_fingers_interval: Duration,
    fix_fingers_mode: FixFingersMode,
    cancel_token: CancellationToken,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl ProcessorBuilder {
    /// initialize a [ProcessorBuilder] with a serialized [Config].
    pub fn from_serialized(config: &str) -> Result<Self> {
        let config = serde_yaml::from_str::<Config>(config).map_err(Error::SerdeYamlError)?;
        Ok(Self::from_config(&config))
    }

    /// initialize a [ProcessorBuilder] with a [Config].
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Build the [Processor]: install logging at the configured level, then create
    /// every configured member and join it.
    pub fn build(self) -> Result<Processor> {
        init_logging(self.config.log_level);
        let space = self.config.id_space()?;
        let swarm = Arc::new(Swarm::new(space));

        let mut identities = self.config.identities.iter();
        let seed_identity = identities.next().ok_or(Error::NoSeedIdentity)?;
        let seed = swarm
            .create_node(seed_identity)
            .map_err(Error::CreateNodeError)?;
        swarm
            .join(&seed, Some(&seed))
            .map_err(Error::JoinError)?;
        tracing::info!("seed {} ({}) starts the ring", seed.did, seed.identity);

        let processor = Processor {
            swarm,
            seed,
            stabilize_interval: self.config.stabilize_interval(),
            fix_fingers_interval: self.config.fix_fingers_interval(),
            fix_fingers_mode: self.config.fix_fingers_mode,
            cancel_token: CancellationToken::new(),
            handles: Arc::new(Mutex::new(vec![])),
        };
        for identity in identities {
            processor.add_node(identity)?;
        }
        Ok(processor)
    }
}

impl Processor {
    /// The member every other member joined through.
    pub fn seed(&self) -> Arc<PeerRing> {
        self.seed.clone()
    }

    /// Did of the seed member.
    pub fn did(&self) -> Did {
        self.seed.did
    }

    /// Create a member and join it through the seed.
    /// When the processor is running, its periodic tasks start right away.
    pub fn add_node(&self, identity: &str) -> Result<Arc<PeerRing>> {
        // Held until the tasks are spawned, so `start` sees either all or none of this member.
        let mut handles = self.lock_handles();
        let node = self
            .swarm
            .create_node(identity)
            .map_err(Error::CreateNodeError)?;
        self.swarm
            .join(&node, Some(&self.seed))
            .map_err(Error::JoinError)?;
        if self.is_running(&handles) {
            self.spawn_node(&mut handles, node.clone());
        }
        Ok(node)
    }

    fn is_running(&self, handles: &[JoinHandle<()>]) -> bool {
        !handles.is_empty() && !self.cancel_token.is_cancelled()
    }

    fn lock_handles(&self) -> MutexGuard<Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_node(&self, handles: &mut Vec<JoinHandle<()>>, node: Arc<PeerRing>) {
        let stabilizer = Arc::new(Stabilizer::with_mode(
            self.swarm.clone(),
            node.clone(),
            self.fix_fingers_mode,
        ));

        let token = self.cancel_token.child_token();
        let stabilize = stabilizer.clone().wait(self.stabilize_interval);
        handles.push(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = stabilize => {}
            }
        }));

        let token = self.cancel_token.child_token();
        let fix_fingers = stabilizer.wait_fix_fingers(self.fix_fingers_interval);
        handles.push(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = fix_fingers => {}
            }
        }));
        tracing::debug!("start periodic tasks of {}", node.did);
    }

    /// Start the periodic tasks of every member. Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(Error::ProcessorStopped);
        }
        let mut handles = self.lock_handles();
        if self.is_running(&handles) {
            return Ok(());
        }
        for node in self.swarm.nodes() {
            self.spawn_node(&mut handles, node);
        }
        tracing::info!("processor started with {} members", self.swarm.len());
        Ok(())
    }

    /// Start the periodic tasks and wait until the processor is stopped.
    pub async fn listen(&self) -> Result<()> {
        self.start()?;
        self.cancel_token.cancelled().await;
        let handles: Vec<JoinHandle<()>> = self.lock_handles().drain(..).collect();
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                tracing::error!("periodic task failed: {:?}", e);
            }
        }
        Ok(())
    }

    /// Stop every periodic task. A stopped processor cannot be started again.
    pub fn stop(&self) {
        tracing::info!("processor stopping");
        self.cancel_token.cancel();
    }

    /// Store a key on its owner, returns the owner's did.
    pub fn put(&self, key: &str, value: &str) -> Result<Did> {
        self.swarm
            .put(&self.seed, key, value)
            .map_err(Error::Storage)
    }

    /// Read a key from its owner.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.swarm.get(&self.seed, key).map_err(Error::Storage)
    }

    /// Owner of `did` as seen from the seed.
    pub fn find_successor(&self, did: Did) -> Did {
        self.swarm.find_successor(&self.seed, did)
    }

    /// Snapshot of every member.
    pub fn inspect(&self) -> SwarmInspect {
        SwarmInspect::inspect(&self.swarm)
    }
}
