use crate::key_names::vk_to_key;
use crate::key_state::HeldKeys;
use crate::types::{KeyEdge, KeyEvent};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG,
    PEEK_MESSAGE_REMOVE_TYPE, WH_KEYBOARD_LL, WM_KEYUP, WM_SYSKEYUP,
};

struct HookState {
    handle: HHOOK,
    events: Sender<KeyEvent>,
    held: HeldKeys,
}

static HOOK: Mutex<Option<HookState>> = parking_lot::const_mutex(None);

/// Installs the low-level keyboard hook; every key transition is sent to `events`.
/// Must be called from the thread that will run `run_event_loop`.
pub fn install_hook(events: Sender<KeyEvent>) -> anyhow::Result<()> {
    info!("Installing keyboard hook...");

    let handle =
        unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), HINSTANCE::default(), 0) }?;
    if handle.is_invalid() {
        return Err(anyhow::anyhow!("Failed to install hook"));
    }

    *HOOK.lock() = Some(HookState {
        handle,
        events,
        held: HeldKeys::new(),
    });
    info!("Keyboard hook installed. Handle: {:?}", handle);
    Ok(())
}

pub fn uninstall_hook() {
    if let Some(state) = HOOK.lock().take() {
        unsafe {
            let _ = UnhookWindowsHookEx(state.handle);
        }
        info!("Keyboard hook uninstalled.");
    }
}

/// Blocking message loop; low-level hooks are only called while it runs.
pub fn run_event_loop() {
    info!("Starting message loop...");
    let mut msg = MSG::default();
    unsafe {
        // Force message queue creation
        let _ = PeekMessageW(&mut msg, None, 0, 0, PEEK_MESSAGE_REMOVE_TYPE(0));

        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
    info!("Message loop exited.");
}

unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        return CallNextHookEx(None, code, wparam, lparam);
    }

    let kbd = &*(lparam.0 as *const KBDLLHOOKSTRUCT);

    // Synthesized input is not user typing.
    if kbd.flags.0 & LLKHF_INJECTED.0 == 0 {
        let msg = wparam.0 as u32;
        let edge = if msg == WM_KEYUP || msg == WM_SYSKEYUP {
            KeyEdge::Up
        } else {
            KeyEdge::Down
        };
        let vk = kbd.vkCode as u16;
        let t = Instant::now();
        if let Some(state) = HOOK.lock().as_mut() {
            // Key-ups are lost while the secure desktop is up (Win+L).
            let missed = state.held.on_transition(vk, edge, is_key_down);
            for k in missed {
                debug!("Releasing {} after a missed key-up", vk_to_key(k).name());
                let _ = state.events.send(KeyEvent::up(vk_to_key(k), t));
            }
            let event = KeyEvent {
                key: vk_to_key(vk),
                edge,
                t,
            };
            if state.events.send(event).is_err() {
                warn!("Engine is gone; dropping key event");
            }
        }
    }

    // Never swallow keys: the trigger chord must still copy as usual.
    CallNextHookEx(None, code, wparam, lparam)
}

fn is_key_down(vk: u16) -> bool {
    unsafe { GetAsyncKeyState(vk as i32) as u16 & 0x8000 != 0 }
}
