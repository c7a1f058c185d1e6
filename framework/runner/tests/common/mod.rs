//! A scripted, in-memory browser driver for exercising the runner without a browser.
//!
//! Sessions are numbered in launch order starting from 0. Faults target a session number rather
//! than a user id because the order in which user threads launch is not fixed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use stampede_runner::prelude::{
    BrowserDriver, BrowserSession, DriverError, DriverResult, RunConfiguration,
};

pub const START_SELECTOR: &str = "button";
pub const OPTION_SELECTOR: &str = ".grid button";
pub const RESULTS_SELECTOR: &str = ".text-3xl";

/// A configuration suitable for fast tests.
pub fn test_config(total_users: usize, steps: usize) -> RunConfiguration {
    RunConfiguration {
        target_url: "http://quiz.test/".to_string(),
        total_users,
        steps,
        action_delay: Duration::ZERO,
        selector_timeout: Duration::from_millis(500),
        user_timeout: None,
        start_selector: START_SELECTOR.to_string(),
        option_selector: OPTION_SELECTOR.to_string(),
        results_selector: RESULTS_SELECTOR.to_string(),
        seed: None,
    }
}

#[derive(Debug, Clone)]
pub enum Fault {
    /// Fail the launch of this session.
    Launch { session: usize },
    /// Time out the nth (1-based) wait for `selector` in this session.
    SelectorTimeout {
        session: usize,
        selector: &'static str,
        occurrence: usize,
    },
    /// Never resolve the nth wait for `selector`. `None` stalls every session.
    Stall {
        session: Option<usize>,
        selector: &'static str,
        occurrence: usize,
    },
    /// Create this session, then take `delay` before handing it back. `None` slows every launch.
    SlowLaunch {
        session: Option<usize>,
        delay: Duration,
    },
    /// Panic while clicking in this session.
    PanicOnClick { session: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub selector: String,
    pub index: usize,
    pub available: usize,
}

#[derive(Default)]
struct Shared {
    launch_attempts: AtomicUsize,
    ready_calls: AtomicUsize,
    stalled: AtomicUsize,
    created: Mutex<Vec<usize>>,
    closes: Mutex<HashMap<usize, usize>>,
    clicks: Mutex<HashMap<usize, Vec<Click>>>,
}

pub struct ScriptedDriver {
    options_per_step: usize,
    ready: bool,
    faults: Vec<Fault>,
    shared: Arc<Shared>,
}

impl ScriptedDriver {
    pub fn new(options_per_step: usize) -> Self {
        Self {
            options_per_step,
            ready: true,
            faults: Vec::new(),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn ready_calls(&self) -> usize {
        self.shared.ready_calls.load(Ordering::SeqCst)
    }

    pub fn launch_attempts(&self) -> usize {
        self.shared.launch_attempts.load(Ordering::SeqCst)
    }

    /// Sessions that were launched successfully.
    pub fn sessions_created(&self) -> usize {
        self.shared.created.lock().len()
    }

    pub fn stalled(&self) -> usize {
        self.shared.stalled.load(Ordering::SeqCst)
    }

    /// How many times each created session was closed.
    pub fn close_counts(&self) -> Vec<usize> {
        let closes = self.shared.closes.lock();
        self.shared
            .created
            .lock()
            .iter()
            .map(|session| closes.get(session).copied().unwrap_or(0))
            .collect()
    }

    pub fn clicks(&self) -> HashMap<usize, Vec<Click>> {
        self.shared.clicks.lock().clone()
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    type Session = ScriptedSession;

    async fn ready(&self) -> DriverResult<()> {
        self.shared.ready_calls.fetch_add(1, Ordering::SeqCst);
        if self.ready {
            Ok(())
        } else {
            Err(DriverError::launch("no automation environment"))
        }
    }

    async fn launch_session(&self) -> DriverResult<ScriptedSession> {
        let session = self.shared.launch_attempts.fetch_add(1, Ordering::SeqCst);

        let launch_fails = self
            .faults
            .iter()
            .any(|fault| matches!(fault, Fault::Launch { session: s } if *s == session));
        if launch_fails {
            return Err(DriverError::launch(format!("session {session} refused")));
        }

        self.shared.created.lock().push(session);

        let slow_launch = self.faults.iter().find_map(|fault| match fault {
            Fault::SlowLaunch { session: s, delay }
                if s.map_or(true, |s| s == session) =>
            {
                Some(*delay)
            }
            _ => None,
        });
        if let Some(delay) = slow_launch {
            tokio::time::sleep(delay).await;
        }

        Ok(ScriptedSession {
            session,
            options_per_step: self.options_per_step,
            faults: self.faults.clone(),
            shared: self.shared.clone(),
            waits: HashMap::new(),
        })
    }
}

pub struct ScriptedSession {
    session: usize,
    options_per_step: usize,
    faults: Vec<Fault>,
    shared: Arc<Shared>,
    waits: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct ScriptedElement {
    selector: String,
    index: usize,
    available: usize,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    type Element = ScriptedElement;

    async fn navigate(&mut self, _url: &str) -> DriverResult<()> {
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<Vec<ScriptedElement>> {
        let occurrence = {
            let count = self.waits.entry(selector.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        for fault in &self.faults {
            match fault {
                Fault::SelectorTimeout {
                    session,
                    selector: s,
                    occurrence: o,
                } if *session == self.session && *s == selector && *o == occurrence => {
                    return Err(DriverError::selector_timeout(selector, timeout));
                }
                Fault::Stall {
                    session,
                    selector: s,
                    occurrence: o,
                } if session.map_or(true, |session| session == self.session)
                    && *s == selector
                    && *o == occurrence =>
                {
                    self.shared.stalled.fetch_add(1, Ordering::SeqCst);
                    std::future::pending::<()>().await;
                }
                _ => {}
            }
        }

        let available = if selector == OPTION_SELECTOR {
            self.options_per_step
        } else {
            1
        };

        Ok((0..available)
            .map(|index| ScriptedElement {
                selector: selector.to_string(),
                index,
                available,
            })
            .collect())
    }

    async fn click(&mut self, element: &ScriptedElement) -> DriverResult<()> {
        let panics = self
            .faults
            .iter()
            .any(|fault| matches!(fault, Fault::PanicOnClick { session } if *session == self.session));
        if panics {
            panic!("scripted panic in session {}", self.session);
        }

        if element.index >= element.available {
            return Err(DriverError::click(format!(
                "index {} out of {}",
                element.index, element.available
            )));
        }

        self.shared
            .clicks
            .lock()
            .entry(self.session)
            .or_default()
            .push(Click {
                selector: element.selector.clone(),
                index: element.index,
                available: element.available,
            });

        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        *self.shared.closes.lock().entry(self.session).or_insert(0) += 1;
        Ok(())
    }
}
