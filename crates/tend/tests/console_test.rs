//! Integration tests for the console loop against an in-process host.

use tend::{run, Command, Console, Step};
use tend_core::{AppConfig, PageKey};
use tend_transport::{channel_pair, HostToUi, IncomingData, UiToHost};

#[test]
fn test_console_commands() {
    let (ui, mut host) = channel_pair();
    let mut console = Console::new(&AppConfig::default(), &ui);
    assert_eq!(console.page(), &PageKey::from("terminals"));

    let step = console.execute(Command::New).unwrap();
    assert_eq!(step, Step::Continue("Added Terminal 1".to_string()));
    console.execute(Command::New).unwrap();

    let Some(UiToHost::Create { id: first }) = host.try_recv() else {
        panic!("expected create");
    };
    let Some(UiToHost::Create { id: second }) = host.try_recv() else {
        panic!("expected create");
    };

    // Typing before the host acknowledged the process is refused
    assert!(console.execute(Command::Type("ls".to_string())).is_err());

    console.handle_host_message(HostToUi::Ready { id: second });
    console
        .execute(Command::Type("echo hi".to_string()))
        .unwrap();
    console.execute(Command::Enter).unwrap();
    assert_eq!(
        host.drain(),
        vec![
            UiToHost::Keystroke {
                id: second,
                bytes: "echo hi".to_string()
            },
            UiToHost::Keystroke {
                id: second,
                bytes: "\r".to_string()
            },
        ]
    );

    console.handle_host_message(HostToUi::Data(IncomingData::Addressed {
        id: second,
        bytes: "hi\r\n$ ".to_string(),
    }));
    let Step::Continue(screen) = console.execute(Command::Screen).unwrap() else {
        panic!("expected output");
    };
    assert!(screen.ends_with("hi\n$"));

    let Step::Continue(list) = console.execute(Command::List).unwrap() else {
        panic!("expected output");
    };
    assert_eq!(list, "  1 Terminal 1 [starting]\n* 2 Terminal 2 [ready]");

    let step = console.execute(Command::Tab(1)).unwrap();
    assert_eq!(step, Step::Continue("Switched to Terminal 1".to_string()));
    assert!(console.execute(Command::Tab(9)).is_err());

    console.execute(Command::Close(None)).unwrap();
    assert_eq!(host.drain(), vec![UiToHost::Remove { id: first }]);
    assert_eq!(console.workspace().sessions_for_page(console.page()).len(), 1);

    assert_eq!(console.execute(Command::Quit).unwrap(), Step::Quit);
}

#[test]
fn test_page_switch() {
    let (ui, _host) = channel_pair();
    let mut console = Console::new(&AppConfig::default(), &ui);

    let step = console
        .execute(Command::Page(PageKey::from("files")))
        .unwrap();
    assert_eq!(step, Step::Continue("File Explorer (0 tabs)".to_string()));
    assert_eq!(
        console.execute(Command::New).unwrap(),
        Step::Continue("Added File Explorer 1".to_string())
    );
    assert!(console.execute(Command::Close(Some(2))).is_err());
}

#[tokio::test]
async fn test_run_until_quit() {
    let (mut ui, mut host) = channel_pair();
    let mut console = Console::new(&AppConfig::default(), &ui);
    let input: &[u8] = b"new\nlist\nbogus\n\nquit\nnew\n";
    let mut output = Vec::new();

    run(&mut console, &mut ui, input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Added Terminal 1"));
    assert!(text.contains("* 1 Terminal 1 [starting]"));
    assert!(text.contains("error: unknown command 'bogus'"));
    assert!(!text.contains("Terminal 2"));

    let messages = host.drain();
    assert_eq!(messages.len(), 2);
    assert!(matches!(messages[0], UiToHost::Create { .. }));
    assert!(matches!(messages[1], UiToHost::Remove { .. }));
    assert!(console.workspace().registry().is_empty());
}

#[tokio::test]
async fn test_run_stops_when_host_goes_away() {
    let (mut ui, host) = channel_pair();
    let mut console = Console::new(&AppConfig::default(), &ui);
    drop(host);

    // Input never ends; the closed transport ends the loop
    let (_keep_open, input) = tokio::io::duplex(64);
    let input = tokio::io::BufReader::new(input);
    run(&mut console, &mut ui, input, tokio::io::sink())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_run_closes_sessions_when_input_fails() {
    let (mut ui, mut host) = channel_pair();
    let mut console = Console::new(&AppConfig::default(), &ui);
    let input: &[u8] = b"new\n\xff\xfe\n";

    let result = run(&mut console, &mut ui, input, tokio::io::sink()).await;
    assert!(result.is_err());

    let messages = host.drain();
    assert_eq!(messages.len(), 2);
    assert!(matches!(messages[0], UiToHost::Create { .. }));
    assert!(matches!(messages[1], UiToHost::Remove { .. }));
    assert!(console.workspace().registry().is_empty());
}
