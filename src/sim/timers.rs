//! Cancellable delayed transitions
//!
//! Two slots exist: the water-rise activation and the end-of-life transition
//! (respawn or game over). Each holds at most one task, stamped with the life
//! it was armed in. Deadlines are measured on the session's simulation clock.

use serde::{Deserialize, Serialize};

/// A delayed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Start the water rising
    WaterRise,
    /// Bring the character back after a death
    Respawn,
    /// Out of lives: show the game over screen
    GameOver,
}

impl TaskKind {
    fn slot(self) -> usize {
        match self {
            TaskKind::WaterRise => 0,
            TaskKind::Respawn | TaskKind::GameOver => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Pending {
    kind: TaskKind,
    due: f64,
    life: u64,
}

/// Single-shot task slots keyed by life
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    slots: [Option<Pending>; 2],
    life: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the current life
    pub fn life(&self) -> u64 {
        self.life
    }

    /// Start a new life: everything armed for earlier lives is dropped
    pub fn begin_life(&mut self) -> u64 {
        self.cancel_all();
        self.life += 1;
        self.life
    }

    /// Arm `kind` to fire at clock time `due`.
    ///
    /// Returns false (and leaves the existing task alone) if the slot is taken
    /// by a task of the current life.
    pub fn schedule(&mut self, kind: TaskKind, due: f64) -> bool {
        let slot = &mut self.slots[kind.slot()];
        if let Some(pending) = *slot {
            if pending.life == self.life {
                log::debug!("{:?} not armed, {:?} already pending", kind, pending.kind);
                return false;
            }
        }
        log::debug!("Armed {:?} at t={:.2} (life {})", kind, due, self.life);
        *slot = Some(Pending {
            kind,
            due,
            life: self.life,
        });
        true
    }

    /// Disarm `kind` if it is pending
    pub fn cancel(&mut self, kind: TaskKind) {
        let slot = &mut self.slots[kind.slot()];
        if slot.is_some_and(|p| p.kind == kind) {
            log::debug!("Cancelled {:?}", kind);
            *slot = None;
        }
    }

    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(pending) = slot.take() {
                log::debug!("Cancelled {:?}", pending.kind);
            }
        }
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.slots[kind.slot()].is_some_and(|p| p.kind == kind && p.life == self.life)
    }

    /// Take every task due at `now`, earliest first.
    ///
    /// Tasks stamped with an earlier life are discarded instead of returned.
    pub fn poll(&mut self, now: f64) -> Vec<TaskKind> {
        let mut fired: Vec<Pending> = Vec::new();
        for slot in &mut self.slots {
            let Some(pending) = *slot else {
                continue;
            };
            if pending.life != self.life {
                log::debug!("Dropped stale {:?} from life {}", pending.kind, pending.life);
                *slot = None;
            } else if pending.due <= now {
                *slot = None;
                fired.push(pending);
            }
        }
        fired.sort_by(|a, b| a.due.total_cmp(&b.due));
        fired.into_iter().map(|p| p.kind).collect()
    }
}
