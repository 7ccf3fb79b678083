use std::io::{BufReader, Cursor, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use massspring::network::codec::{self, CodecError};
use massspring::network::server::respond;
use massspring::{Body, NVec3, Runner, Server, SharedWorld, Snapshot, World};

/// Two bodies joined by one spring, shared for threaded use
fn shared_world() -> SharedWorld {
    let mut world = World::default();
    let a = world.add_body(Body::builder().position(1.5, -2.0, 0.0).build().unwrap());
    let b = world.add_body(Body::builder().position(10.0, 20.0, 30.25).build().unwrap());
    world.add_spring(a, b, 5.0, 0.0).unwrap();
    world.into_shared()
}

// ==================================================================================
// Codec tests
// ==================================================================================

#[test]
fn encode_mass_message() {
    let snapshot = Snapshot {
        tick: 0,
        masses: vec![NVec3::new(1.5, -2.0, 0.0), NVec3::new(10.0, 20.0, 30.25)],
        springs: Vec::new(),
    };
    assert_eq!(codec::encode_masses(&snapshot), "mass\n1.5,-2,0\n10,20,30.25\n");
}

#[test]
fn encode_spring_message() {
    let snapshot = Snapshot {
        tick: 0,
        masses: Vec::new(),
        springs: vec![(NVec3::new(0.0, 1.0, 2.0), NVec3::new(-3.0, 4.5, 5.0))],
    };
    assert_eq!(codec::encode_springs(&snapshot), "spring\n0,1,2;-3,4.5,5\n");
}

#[test]
fn decode_reads_back_world_snapshot() {
    let world = shared_world();
    let snapshot = world.lock().unwrap().snapshot();

    let masses = codec::decode_masses(&codec::encode_masses(&snapshot)).unwrap();
    let springs = codec::decode_springs(&codec::encode_springs(&snapshot)).unwrap();

    assert_eq!(masses, snapshot.masses);
    assert_eq!(springs, snapshot.springs);
}

#[test]
fn decode_rejects_malformed_messages() {
    assert!(matches!(
        codec::decode_masses("spring\n1,2,3\n"),
        Err(CodecError::Header { expected: "mass", .. })
    ));
    assert!(matches!(codec::decode_masses("mass\n1,2\n"), Err(CodecError::Line { line: 2, .. })));
    assert!(matches!(codec::decode_masses("mass\n1,2,3\n1,x,3\n"), Err(CodecError::Line { line: 3, .. })));
    assert!(matches!(codec::decode_springs("spring\n1,2,3\n"), Err(CodecError::Line { line: 2, .. })));

    assert_eq!(codec::decode_masses("mass\n").unwrap(), Vec::<NVec3>::new());
}

#[test]
fn control_tokens_end_session() {
    assert!(codec::is_control("exit"));
    assert!(codec::is_control("quit\r"));
    assert!(codec::is_control("mass quit"));
    assert!(codec::is_control("quit;"));
    assert!(codec::is_control("mass,exit"));
    assert!(codec::is_control("[exit]"));
    assert!(!codec::is_control("mass"));
    assert!(!codec::is_control("exited"));
    assert!(!codec::is_control("requit"));
}

#[test]
fn frames_are_length_prefixed() {
    let mut wire = Vec::new();
    codec::write_frame(&mut wire, b"mass\n1,2,3\n").unwrap();
    codec::write_frame(&mut wire, b"").unwrap();
    assert!(wire.starts_with(b"11\nmass\n"));

    let mut reader = Cursor::new(wire);
    assert_eq!(codec::read_frame(&mut reader).unwrap(), b"mass\n1,2,3\n");
    assert_eq!(codec::read_frame(&mut reader).unwrap(), b"");
    assert!(matches!(codec::read_frame(&mut reader), Err(CodecError::Closed)));
}

#[test]
fn frame_errors() {
    let mut bad_len = Cursor::new(b"abc\n".to_vec());
    assert!(matches!(codec::read_frame(&mut bad_len), Err(CodecError::Length(_))));

    let huge = format!("{}\n", codec::MAX_FRAME_LEN + 1);
    let mut too_large = Cursor::new(huge.into_bytes());
    assert!(matches!(codec::read_frame(&mut too_large), Err(CodecError::TooLarge(_))));

    let mut short = Cursor::new(b"10\nmass\n".to_vec());
    assert!(matches!(codec::read_frame(&mut short), Err(CodecError::Io(_))));
}

// ==================================================================================
// Server tests
// ==================================================================================

#[test]
fn respond_dispatches_on_request() {
    let world = shared_world();

    let masses = String::from_utf8(respond(&world, "mass\n")).unwrap();
    assert_eq!(codec::decode_masses(&masses).unwrap().len(), 2);

    let springs = String::from_utf8(respond(&world, " spring ")).unwrap();
    assert_eq!(codec::decode_springs(&springs).unwrap().len(), 1);

    assert!(respond(&world, "velocity").is_empty());
}

#[test]
fn server_session_over_loopback() {
    let world = shared_world();
    let server = Server::bind("127.0.0.1:0", Arc::clone(&world)).unwrap();
    let addr = server.local_addr().unwrap();

    let accept = thread::spawn(move || server.accept_one().unwrap().join().unwrap());

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    stream.write_all(b"mass\n").unwrap();
    let payload = codec::read_frame(&mut reader).unwrap();
    let masses = codec::decode_masses(std::str::from_utf8(&payload).unwrap()).unwrap();
    assert_eq!(masses, vec![NVec3::new(1.5, -2.0, 0.0), NVec3::new(10.0, 20.0, 30.25)]);

    stream.write_all(b"spring\n").unwrap();
    let payload = codec::read_frame(&mut reader).unwrap();
    let springs = codec::decode_springs(std::str::from_utf8(&payload).unwrap()).unwrap();
    assert_eq!(springs.len(), 1);

    stream.write_all(b"hello\n").unwrap();
    assert!(codec::read_frame(&mut reader).unwrap().is_empty());

    stream.write_all(b"quit\n").unwrap();
    assert!(matches!(codec::read_frame(&mut reader), Err(CodecError::Closed)));

    accept.join().unwrap();
}

#[test]
fn runner_steps_shared_world() {
    let world = shared_world();
    let runner = Runner::spawn(Arc::clone(&world), Duration::ZERO, None);
    thread::sleep(Duration::from_millis(20));

    // readers can take snapshots while the runner steps
    let snapshot = world.lock().unwrap().snapshot();
    assert_eq!(snapshot.masses.len(), 2);

    let steps = runner.stop();
    assert!(steps > 0, "runner never stepped");
    assert_eq!(world.lock().unwrap().tick(), steps);
}

#[test]
fn session_ends_on_embedded_control_token() {
    let world = shared_world();
    let server = Server::bind("127.0.0.1:0", Arc::clone(&world)).unwrap();
    let addr = server.local_addr().unwrap();
    let accept = thread::spawn(move || server.accept_one().unwrap().join().unwrap());

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    stream.write_all(b"mass,exit\n").unwrap();
    assert!(matches!(codec::read_frame(&mut reader), Err(CodecError::Closed)));

    accept.join().unwrap();
}

#[test]
fn bounded_runner_shuts_down_served_world() {
    let world = shared_world();
    let server = Server::bind("127.0.0.1:0", Arc::clone(&world)).unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle().unwrap();
    let serving = thread::spawn(move || server.serve());

    let runner = Runner::spawn(Arc::clone(&world), Duration::ZERO, Some(25));

    // a client is answered while the runner steps
    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    stream.write_all(b"mass\n").unwrap();
    let payload = codec::read_frame(&mut reader).unwrap();
    assert_eq!(codec::decode_masses(std::str::from_utf8(&payload).unwrap()).unwrap().len(), 2);
    stream.write_all(b"quit\n").unwrap();

    assert_eq!(runner.wait(), 25);
    assert_eq!(world.lock().unwrap().tick(), 25);

    shutdown.shutdown();
    shutdown.shutdown();
    assert_eq!(serving.join().unwrap(), 1);
}

#[test]
fn runner_stop_returns_while_serving() {
    let world = shared_world();
    let server = Server::bind("127.0.0.1:0", Arc::clone(&world)).unwrap();
    let shutdown = server.shutdown_handle().unwrap();
    let serving = thread::spawn(move || server.serve());

    let runner = Runner::spawn(Arc::clone(&world), Duration::from_micros(100), None);
    thread::sleep(Duration::from_millis(10));
    let steps = runner.stop();
    assert_eq!(world.lock().unwrap().tick(), steps);

    shutdown.shutdown();
    assert_eq!(serving.join().unwrap(), 0);
}
