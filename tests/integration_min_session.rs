// Drives the compiled binary through a PTY so the real event loop and
// crossterm input handling are exercised end to end.
//
// Requires a TTY; expectrl allocates a pseudo terminal. Ignored by default,
// run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn one_question_game_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("mathsprint");
    let cmd = format!("{} -q 1 -t 1000 --feedback 200", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start, pick the first choice, wait out the feedback pause
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("1")?;
    std::thread::sleep(Duration::from_millis(400));

    p.send("q")?;
    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn idle_game_times_out_and_exits_on_escape() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("mathsprint");
    let cmd = format!("{} -q 2 -t 300 --feedback 100", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(1200));

    p.send("\x1b")?;
    p.expect(Eof)?;
    Ok(())
}
