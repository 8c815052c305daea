//! End-to-end pipeline over canned tool output: parse, derive, then drive a session.

use std::time::Duration;

use chrono::Local;
use portpilot_core::adapters::scanner::parser::{parse_output, ToolFormat};
use portpilot_core::{derive, Effect, Event, Key, Session, SortColumn, SortSpec, ViewMode};

const LSOF_OUTPUT: &str = r#"COMMAND     PID   USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
node      12345   mike    4u  IPv4 0x1111      0t0  TCP *:3000 (LISTEN)
node      12345   mike    5u  IPv6 0x2222      0t0  TCP *:3000 (LISTEN)
python3   23456   mike    3u  IPv4 0x3333      0t0  TCP 127.0.0.1:8080 (LISTEN)
nginx     34567   root    6u  IPv6 0x4444      0t0  TCP [::]:8080 (LISTEN)
mDNSRespo    88  _mdns    7u  IPv4 0x5555      0t0  UDP *:5353
"#;

const SS_OUTPUT: &str = r#"Netid State  Recv-Q Send-Q Local Address:Port Peer Address:Port Process
tcp   LISTEN 0      128    0.0.0.0:22         0.0.0.0:*         users:(("sshd",pid=1234,fd=3))
tcp   LISTEN 0      128    [::]:22            [::]:*            users:(("sshd",pid=1234,fd=4))
udp   UNCONN 0      0      0.0.0.0:5353       0.0.0.0:*         users:(("avahi-daemon",pid=567,fd=12))
"#;

#[test]
fn lsof_output_to_display_list() {
    let records = parse_output(LSOF_OUTPUT, ToolFormat::Lsof);
    assert_eq!(records.len(), 4);

    let list = derive(&records, "", SortSpec::default());
    let ports: Vec<u16> = list.rows.iter().map(|r| r.port).collect();
    assert_eq!(ports, vec![3000, 5353, 8080, 8080]);
    assert!(list.is_conflict(8080));
    assert!(!list.is_conflict(3000));

    let list = derive(&records, "nginx", SortSpec::default());
    assert_eq!(list.len(), 1);
    assert!(list.conflicts.is_empty());
}

#[test]
fn connected_udp_client_does_not_conflict_with_listener() {
    let output = "\
named 50 root 4u IPv4 0x1 0t0 UDP *:53
Chrome 900 mike 30u IPv4 0x2 0t0 UDP 192.168.1.10:61234->8.8.8.8:53
";
    let records = parse_output(output, ToolFormat::Lsof);
    let list = derive(&records, "", SortSpec::default());
    assert_eq!(list.len(), 1);
    assert!(!list.is_conflict(53));
    assert!(list.conflicts.is_empty());
}

#[test]
fn ss_output_collapses_dual_stack_sockets() {
    let records = parse_output(SS_OUTPUT, ToolFormat::Ss);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.state == "LISTEN"));

    let by_pid = SortSpec {
        column: SortColumn::Pid,
        ascending: false,
    };
    let list = derive(&records, "", by_pid);
    assert_eq!(list.rows[0].process_name, "sshd");
}

#[test]
fn session_over_parsed_snapshot() {
    let records = parse_output(LSOF_OUTPUT, ToolFormat::Lsof);
    let mut session = Session::new(Duration::from_secs(2));

    let effects = session.start();
    let seq = match effects.first() {
        Some(Effect::Scan { seq }) => *seq,
        other => panic!("expected a scan first, got {:?}", other),
    };
    session.handle(Event::ScanCompleted {
        seq,
        result: Ok(records),
        finished_at: Local::now(),
    });

    // Sort by process name and select the last row.
    session.handle(Event::Key(Key::Char('4')));
    session.handle(Event::Key(Key::End));
    assert_eq!(session.selected().map(|r| r.process_name.as_str()), Some("python3"));

    session.handle(Event::Key(Key::Char('k')));
    assert_eq!(session.mode(), ViewMode::ConfirmKill);
    let effects = session.handle(Event::Key(Key::Char('y')));
    match effects.as_slice() {
        [Effect::SendSignal { target, .. }] => {
            assert_eq!(target.pid, 23456);
            assert_eq!(target.port, 8080);
        }
        other => panic!("expected a signal request, got {:?}", other),
    }
}
