#![windows_subsystem = "windows"]

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    shell::run()
}

#[cfg(not(windows))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("HearHere switches Windows audio endpoints and only runs on Windows")
}

#[cfg(windows)]
mod shell {
    use hear_here::app::WM_AUDIO_EVENT;
    use hear_here::audio::ComGuard;
    use hear_here::config::{app_data_dir, ConfigStore};
    use hear_here::logging::{self, LoggingConfig};
    use hear_here::AppState;
    use std::cell::RefCell;
    use tracing::{error, info};
    use windows::core::*;
    use windows::Win32::Foundation::*;
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::WindowsAndMessaging::*;

    thread_local! {
        static APP_STATE: RefCell<Option<AppState>> = const { RefCell::new(None) };
    }

    fn show_error(msg: &str) {
        unsafe {
            let msg_wide: Vec<u16> = msg.encode_utf16().chain(std::iter::once(0)).collect();
            let title_wide: Vec<u16> = "HearHere".encode_utf16().chain(std::iter::once(0)).collect();
            MessageBoxW(None, PCWSTR(msg_wide.as_ptr()), PCWSTR(title_wide.as_ptr()), MB_OK | MB_ICONERROR);
        }
    }

    pub fn run() -> anyhow::Result<()> {
        let app_dir = app_data_dir()?;
        let _log_guard = logging::initialize_logging(LoggingConfig {
            log_dir: Some(logging::log_dir(&app_dir)),
            ..LoggingConfig::default()
        })?;
        info!("HearHere starting");

        let _com = match ComGuard::new() {
            Ok(guard) => guard,
            Err(e) => {
                error!(error = %e, "COM init failed");
                show_error(&format!("COM init failed: {}", e));
                return Err(e.into());
            }
        };

        let hwnd = create_message_window()?;

        match AppState::new(hwnd, ConfigStore::default_location()?) {
            Ok(state) => APP_STATE.with(|slot| *slot.borrow_mut() = Some(state)),
            Err(e) => {
                error!(error = %e, "Fatal startup error");
                show_error(&format!("HearHere failed to start:\n{}", e));
                return Err(e);
            }
        }

        unsafe {
            let mut msg = MSG::default();
            while GetMessageW(&mut msg, None, 0, 0).into() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);

                // Tray menu clicks are queued by tray-icon while dispatching.
                let exit = with_app_state(|app| {
                    app.process_tray_events();
                    app.should_exit()
                });
                if exit == Some(true) {
                    let _ = DestroyWindow(hwnd);
                }
            }
        }

        // Drop the app (unregistering hotkeys and the notification client)
        // while COM is still initialized.
        drop(APP_STATE.with(|slot| slot.borrow_mut().take()));
        info!("HearHere exited");
        Ok(())
    }

    fn create_message_window() -> Result<HWND> {
        unsafe {
            let instance = GetModuleHandleW(None)?;

            let window_class = w!("HearHereWindow");
            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(window_proc),
                hInstance: instance.into(),
                lpszClassName: window_class,
                ..Default::default()
            };

            RegisterClassExW(&wc);

            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                window_class,
                w!("HearHere"),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                None,
                None,
                instance,
                None,
            )
        }
    }

    /// Run `f` against the app state unless it is missing or already borrowed
    /// further up the stack.
    fn with_app_state<F, R>(f: F) -> Option<R>
    where
        F: FnOnce(&mut AppState) -> R,
    {
        APP_STATE.with(|state| {
            let mut guard = state.try_borrow_mut().ok()?;
            guard.as_mut().map(f)
        })
    }

    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_HOTKEY => {
                let id = wparam.0 as i32;
                with_app_state(|app| app.handle_hotkey(id));
                LRESULT(0)
            }
            WM_AUDIO_EVENT => {
                with_app_state(|app| app.handle_audio_events());
                LRESULT(0)
            }
            WM_DESTROY => {
                with_app_state(|app| app.shutdown());
                PostQuitMessage(0);
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}
