//! Integration tests driving a workspace against an in-process fake host.

use std::time::{Duration, Instant};

use tend_core::{AppConfig, Dimensions, PageKey};
use tend_emulator::VtScreen;
use tend_session::{EmulatorFactory, ViewState, Workspace};
use tend_transport::{channel_pair, HostEndpoint, HostToUi, IncomingData, UiToHost};

fn screen_factory() -> EmulatorFactory<VtScreen> {
    Box::new(|_| VtScreen::new(Dimensions::default(), 500))
}

fn workspace() -> (Workspace<VtScreen>, HostEndpoint) {
    let (ui, host) = channel_pair();
    (Workspace::new(ui.sender(), screen_factory()), host)
}

fn data(id: tend_core::SessionId, bytes: &str) -> HostToUi {
    HostToUi::Data(IncomingData::Addressed {
        id,
        bytes: bytes.to_string(),
    })
}

#[test]
fn test_full_session_lifecycle() {
    let (mut ws, mut host) = workspace();
    let files = PageKey::from("files");
    ws.show_page(&files);

    let s1 = ws.add_session(&files);
    assert_eq!(s1.display_name, "File Explorer 1");
    assert_eq!(host.drain(), vec![UiToHost::Create { id: s1.id }]);

    // Keystrokes before readiness never reach the host
    assert!(!ws.send_input(s1.id, "ls\r"));
    assert!(host.drain().is_empty());

    ws.handle_host_message(HostToUi::Ready { id: s1.id });
    let view = ws.view(s1.id).unwrap();
    assert_eq!(view.state(), ViewState::Active);
    assert_eq!(view.emulator().focus_count(), 1);

    assert!(ws.send_input(s1.id, "ls\r"));
    ws.handle_host_message(data(s1.id, "a.txt  b.txt\r\n$ "));
    assert_eq!(
        ws.view(s1.id).unwrap().emulator().lines(),
        vec!["a.txt  b.txt", "$"]
    );

    assert!(ws.close_session(s1.id));
    assert!(ws.view(s1.id).is_none());
    assert_eq!(
        host.drain(),
        vec![
            UiToHost::Keystroke {
                id: s1.id,
                bytes: "ls\r".to_string()
            },
            UiToHost::Remove { id: s1.id },
        ]
    );
    assert!(ws.sessions_for_page(&files).is_empty());
    assert_eq!(ws.active_index(&files), None);
}

#[test]
fn test_removed_session_ignores_stale_messages() {
    let (mut ws, mut host) = workspace();
    let files = PageKey::from("files");
    ws.show_page(&files);
    let s1 = ws.add_session(&files);
    let s2 = ws.add_session(&files);

    ws.close_session(s2.id);
    host.drain();

    ws.handle_host_message(data(s2.id, "late output"));
    ws.handle_host_message(HostToUi::Ready { id: s2.id });
    ws.handle_host_message(HostToUi::Exited {
        id: s2.id,
        exit_code: 137,
    });

    assert!(!ws.close_session(s2.id));
    assert!(host.drain().is_empty());
    assert_eq!(ws.sessions_for_page(&files).len(), 1);
    assert_eq!(ws.active_session(&files).unwrap().id, s1.id);
}

#[test]
fn test_exit_removes_without_remove_message() {
    let (mut ws, mut host) = workspace();
    let git = PageKey::from("git");
    ws.show_page(&git);
    let s1 = ws.add_session(&git);
    let s2 = ws.add_session(&git);
    ws.handle_host_message(HostToUi::Ready { id: s1.id });
    ws.handle_host_message(HostToUi::Ready { id: s2.id });
    host.drain();

    ws.handle_host_message(HostToUi::Exited {
        id: s2.id,
        exit_code: 0,
    });
    assert!(host.drain().is_empty());
    assert_eq!(ws.active_index(&git), Some(0));
    assert_eq!(ws.active_session(&git).unwrap().id, s1.id);

    // Promoted session takes focus on becoming active
    assert_eq!(ws.view(s1.id).unwrap().emulator().focus_count(), 1);
}

#[test]
fn test_resize_reaches_only_visible_active_session() {
    let (mut ws, mut host) = workspace();
    let files = PageKey::from("files");
    let git = PageKey::from("git");

    let g = ws.add_session(&git);
    ws.show_page(&files);
    let f1 = ws.add_session(&files);
    let f2 = ws.add_session(&files);
    for id in [g.id, f1.id, f2.id] {
        ws.handle_host_message(HostToUi::Ready { id });
    }
    host.drain();

    assert_eq!(ws.live_resize_subscriptions(), 1);
    assert_eq!(ws.resize_visible_pane(Dimensions::new(50, 132)), 1);
    assert_eq!(
        host.drain(),
        vec![UiToHost::Resize {
            id: f2.id,
            cols: 132,
            rows: 50
        }]
    );

    ws.select_tab(&files, 0);
    assert_eq!(ws.live_resize_subscriptions(), 1);
    assert!(ws.view(f1.id).unwrap().has_resize_subscription());
    assert!(!ws.view(f2.id).unwrap().has_resize_subscription());

    ws.show_page(&git);
    assert_eq!(ws.live_resize_subscriptions(), 1);
    assert!(ws.view(g.id).unwrap().has_resize_subscription());
    assert!(!ws.view(f1.id).unwrap().has_resize_subscription());
}

#[test]
fn test_legacy_data_goes_to_sole_session() {
    let (mut ws, _host) = workspace();
    let terminals = PageKey::from("terminals");
    ws.show_page(&terminals);
    let s = ws.add_session(&terminals);

    ws.handle_host_message(HostToUi::Data(IncomingData::Legacy {
        bytes: "hello".to_string(),
    }));
    let view = ws.view(s.id).unwrap();
    assert_eq!(view.emulator().contents(), "hello");
    assert!(view.is_ready());
}

#[test]
fn test_legacy_routing_can_be_disabled() {
    let config = AppConfig::from_yaml("transport:\n  accept_legacy_data: false\n").unwrap();
    let (ui, _host) = channel_pair();
    let mut ws = Workspace::from_config(&config, ui.sender(), screen_factory());
    let terminals = PageKey::from("terminals");
    let s = ws.add_session(&terminals);

    ws.handle_host_message(HostToUi::Data(IncomingData::Legacy {
        bytes: "hello".to_string(),
    }));
    assert_eq!(ws.view(s.id).unwrap().emulator().contents(), "");
}

#[test]
fn test_reap_unready_sessions() {
    let config = AppConfig::from_yaml("terminal:\n  spawn_timeout_ms: 500\n").unwrap();
    let (ui, mut host) = channel_pair();
    let mut ws = Workspace::from_config(&config, ui.sender(), screen_factory());
    let files = PageKey::from("files");
    ws.show_page(&files);

    let stuck = ws.add_session(&files);
    let fine = ws.add_session(&files);
    ws.handle_host_message(HostToUi::Ready { id: fine.id });
    host.drain();

    assert!(ws.reap_unready(Instant::now()).is_empty());

    let later = Instant::now() + Duration::from_secs(1);
    assert_eq!(ws.reap_unready(later), vec![stuck.id]);
    assert_eq!(host.drain(), vec![UiToHost::Remove { id: stuck.id }]);
    assert_eq!(ws.sessions_for_page(&files).len(), 1);
    assert!(ws.reap_unready(later).is_empty());
}

#[test]
fn test_shutdown_closes_everything() {
    let (mut ws, mut host) = workspace();
    let a = ws.add_session(&PageKey::from("files"));
    let b = ws.add_session(&PageKey::from("git"));
    host.drain();

    assert_eq!(ws.shutdown(), 2);
    assert!(ws.registry().is_empty());
    assert_eq!(
        host.drain(),
        vec![UiToHost::Remove { id: a.id }, UiToHost::Remove { id: b.id }]
    );
    assert_eq!(ws.live_resize_subscriptions(), 0);
}

#[test]
fn test_show_page_syncs_active_index() {
    let (mut ws, _host) = workspace();
    let files = PageKey::from("files");
    ws.add_session(&files);
    ws.add_session(&files);
    ws.show_page(&files);
    assert_eq!(ws.active_index(&files), Some(1));
    assert_eq!(ws.visible_page(), Some(&files));
}
