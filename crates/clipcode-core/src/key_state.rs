use crate::types::KeyEdge;

/// Virtual-key codes the key source has seen go down and not come back up.
///
/// Low-level hooks are not called while the secure desktop is active
/// (Win+L, Ctrl+Alt+Del), so key-ups can be lost. On every key-down the
/// remembered keys are checked against the live keyboard state and the ones
/// already released are reported, so the caller can emit the missing key-ups.
#[derive(Debug, Default)]
pub struct HeldKeys {
    down: Vec<u16>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, vk: u16) -> bool {
        self.down.contains(&vk)
    }

    /// Records a transition of `vk`; returns keys whose key-up was missed.
    pub fn on_transition(&mut self, vk: u16, edge: KeyEdge, is_down: impl Fn(u16) -> bool) -> Vec<u16> {
        match edge {
            KeyEdge::Up => {
                self.down.retain(|&k| k != vk);
                Vec::new()
            }
            KeyEdge::Down => {
                let mut released = Vec::new();
                self.down.retain(|&k| {
                    if k == vk || is_down(k) {
                        true
                    } else {
                        released.push(k);
                        false
                    }
                });
                if !self.down.contains(&vk) {
                    self.down.push(vk);
                }
                released
            }
        }
    }
}
