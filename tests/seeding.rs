//! End-to-end seeding passes against real files, processes and sockets.

use prng_seed::builtin::BUILTIN_BYTES;
use prng_seed::{Prng, PrngConfig, SeedContext, SeedSource, Seeder, SharedPrng};
use std::io::Write;

fn temp_file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn file_and_builtin_sources_seed_a_fresh_prng() {
    let file = temp_file_with(&[0x42; 64]);
    let prng = SharedPrng::new(&PrngConfig::default());
    let seeder = Seeder::new(
        vec![
            SeedSource::file(SeedContext::Startup, file.path().to_str().unwrap(), 48),
            SeedSource::builtin(SeedContext::Startup),
        ],
        &prng,
    );

    assert!(!prng.is_sufficiently_seeded());
    let total = seeder.seed(SeedContext::Startup, "Init: ");

    assert_eq!(total, 48 + BUILTIN_BYTES);
    assert_eq!(prng.entropy_bytes(), 48 + BUILTIN_BYTES);
    assert!(prng.is_sufficiently_seeded());

    let mut out = [0u8; 32];
    prng.fill_bytes(&mut out).unwrap();
}

#[test]
fn unavailable_sources_yield_zero() {
    let prng = SharedPrng::new(&PrngConfig::default());
    let seeder = Seeder::new(
        vec![
            SeedSource::file(SeedContext::Connect, "/nonexistent/entropy", 32),
            SeedSource::command(SeedContext::Connect, "/nonexistent/entropy-cmd", 32),
            SeedSource::daemon(SeedContext::Connect, "/nonexistent/egd-socket", 32),
        ],
        &prng,
    );

    assert_eq!(seeder.seed(SeedContext::Connect, ""), 0);
    assert!(!prng.is_sufficiently_seeded());
}

#[test]
fn connect_sources_ignored_at_startup() {
    let file = temp_file_with(&[1; 16]);
    let prng = SharedPrng::new(&PrngConfig::default());
    let seeder = Seeder::new(
        vec![SeedSource::file(
            SeedContext::Connect,
            file.path().to_str().unwrap(),
            0,
        )],
        &prng,
    );

    assert_eq!(seeder.seed(SeedContext::Startup, ""), 0);
    assert_eq!(seeder.seed(SeedContext::Connect, ""), 16);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::fs;
    use std::io::Read;
    use std::os::unix::fs::PermissionsExt;
    use std::os::unix::net::UnixListener;
    use std::path::Path;
    use std::thread;

    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn short_command_output_is_counted_as_is() {
        let dir = tempfile::tempdir().unwrap();
        // Ignores the requested count and emits 50 bytes.
        let script = write_script(dir.path(), "short", "head -c 50 /dev/zero");
        let prng = SharedPrng::new(&PrngConfig::default());
        let seeder = Seeder::new(
            vec![
                SeedSource::file(SeedContext::Startup, "/nonexistent/seed", 100),
                SeedSource::command(SeedContext::Startup, script, 100),
                SeedSource::builtin(SeedContext::Startup),
            ],
            &prng,
        );

        assert_eq!(seeder.seed(SeedContext::Startup, ""), 50 + BUILTIN_BYTES);
    }

    #[test]
    fn command_receives_requested_count() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "exact", "head -c \"$1\" /dev/zero");
        let prng = SharedPrng::new(&PrngConfig::default());
        let seeder = Seeder::new(
            vec![SeedSource::command(SeedContext::Startup, script, 777)],
            &prng,
        );

        assert_eq!(seeder.seed(SeedContext::Startup, ""), 777);
    }

    #[test]
    fn failing_command_still_contributes_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fails", "printf 'abcdefgh'; exit 3");
        let prng = SharedPrng::new(&PrngConfig::default());
        let seeder = Seeder::new(
            vec![SeedSource::command(SeedContext::Startup, script, 0)],
            &prng,
        );

        assert_eq!(seeder.seed(SeedContext::Startup, ""), 8);
    }

    #[test]
    fn daemon_source_over_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("egd");
        let listener = UnixListener::bind(&socket).unwrap();

        let daemon = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut request = [0u8; 2];
            conn.read_exact(&mut request).unwrap();
            assert_eq!(request[0], 0x01);
            let n = request[1];
            let mut reply = vec![n];
            reply.extend(std::iter::repeat(0x99).take(n as usize));
            conn.write_all(&reply).unwrap();
        });

        let prng = SharedPrng::new(&PrngConfig::default());
        let seeder = Seeder::new(
            vec![SeedSource::daemon(
                SeedContext::Connect,
                socket.to_str().unwrap(),
                40,
            )],
            &prng,
        );

        assert_eq!(seeder.seed(SeedContext::Connect, ""), 40);
        assert!(prng.is_sufficiently_seeded());
        daemon.join().unwrap();
    }
}
