// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Connectivity Windows

use crate::error::WindowError;
use crate::types::{NodeId, Reachability, Time};

// ─── OnlineWindow ────────────────────────────────────────────────────────────

/// Closed interval `[login, logout]` of time steps during which a node can be
/// reached by a contact attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnlineWindow {
    pub login: Time,
    pub logout: Time,
}

impl OnlineWindow {
    pub fn new(node: NodeId, login: Time, logout: Time) -> Result<Self, WindowError> {
        if login < 0 {
            return Err(WindowError::NegativeLogin { node, login });
        }
        if login > logout {
            return Err(WindowError::Inverted { node, login, logout });
        }
        Ok(Self { login, logout })
    }

    /// Always online. Handy for graphs without window data.
    pub fn always() -> Self {
        Self { login: 0, logout: Time::MAX }
    }

    pub fn is_online(&self, t: Time) -> bool {
        t >= self.login && t <= self.logout
    }

    pub fn is_down(&self, t: Time) -> bool {
        t > self.logout
    }

    pub fn reachability(&self, t: Time) -> Reachability {
        if self.is_down(t) {
            Reachability::Down
        } else if t >= self.login {
            Reachability::Online
        } else {
            Reachability::NotYetOnline
        }
    }
}

// ─── ConnectivityWindows ─────────────────────────────────────────────────────

/// One online window per node, indexed by node id.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityWindows {
    windows: Vec<OnlineWindow>,
}

impl ConnectivityWindows {
    pub fn new(windows: Vec<OnlineWindow>) -> Self {
        Self { windows }
    }

    /// Every node online for all non-negative times.
    pub fn always_online(node_count: usize) -> Self {
        Self { windows: vec![OnlineWindow::always(); node_count] }
    }

    /// Build from `(login, logout)` pairs in node order, validating each.
    pub fn from_pairs(pairs: &[(Time, Time)]) -> Result<Self, WindowError> {
        let windows = pairs
            .iter()
            .enumerate()
            .map(|(i, &(login, logout))| OnlineWindow::new(i as NodeId, login, logout))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { windows })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    #[inline]
    pub fn is_online(&self, u: NodeId, t: Time) -> bool {
        self.windows[u as usize].is_online(t)
    }

    #[inline]
    pub fn reachability(&self, u: NodeId, t: Time) -> Reachability {
        self.windows[u as usize].reachability(t)
    }
}
