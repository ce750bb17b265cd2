//! Minimal in-process SMTP listener for integration tests.
//!
//! Accepts exactly one connection, answers the commands lettre issues, and
//! records what the client sent.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;
use std::time::Duration;

/// What the client sent during the session.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    /// Command lines, CRLF stripped, in order.
    pub commands: Vec<String>,
    /// Raw message received after `DATA`, without the terminating dot.
    pub data: String,
    /// Whether the client said QUIT before closing.
    pub quit: bool,
}

impl Transcript {
    pub fn has_command(&self, prefix: &str) -> bool {
        self.commands
            .iter()
            .any(|c| c.to_ascii_uppercase().starts_with(prefix))
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|c| c.to_ascii_uppercase().starts_with(prefix))
    }

    /// Message data with quoted-printable soft line breaks removed.
    pub fn data_unfolded(&self) -> String {
        self.data.replace("=\r\n", "").replace("=\n", "")
    }
}

/// How the fake server behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Behaviour {
    /// Advertise `AUTH PLAIN LOGIN` in the EHLO reply.
    pub advertise_auth: bool,
    /// Reply `550` to `RCPT TO`.
    pub reject_recipient: bool,
}

pub struct FakeSmtpServer {
    pub port: u16,
    handle: JoinHandle<Transcript>,
}

impl FakeSmtpServer {
    pub fn start(behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake SMTP listener");
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept SMTP client");
            serve(stream, behaviour)
        });

        Self { port, handle }
    }

    /// Wait for the session to end and return what the client sent.
    pub fn finish(self) -> Transcript {
        self.handle.join().expect("fake SMTP server thread panicked")
    }
}

fn serve(stream: TcpStream, behaviour: Behaviour) -> Transcript {
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    let mut transcript = Transcript::default();

    reply(&mut writer, "220 fake.smtp ESMTP ready\r\n");

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let command = line.trim_end_matches(['\r', '\n']).to_string();
        let upper = command.to_ascii_uppercase();
        transcript.commands.push(command);

        if upper.starts_with("EHLO") {
            if behaviour.advertise_auth {
                reply(&mut writer, "250-fake.smtp\r\n250 AUTH PLAIN LOGIN\r\n");
            } else {
                reply(&mut writer, "250 fake.smtp\r\n");
            }
        } else if upper.starts_with("HELO") {
            reply(&mut writer, "250 fake.smtp\r\n");
        } else if upper.starts_with("AUTH") {
            reply(&mut writer, "235 2.7.0 Authentication successful\r\n");
        } else if upper.starts_with("MAIL") {
            reply(&mut writer, "250 2.1.0 OK\r\n");
        } else if upper.starts_with("RCPT") {
            if behaviour.reject_recipient {
                reply(&mut writer, "550 5.1.1 Mailbox unavailable\r\n");
            } else {
                reply(&mut writer, "250 2.1.5 OK\r\n");
            }
        } else if upper.starts_with("DATA") {
            reply(&mut writer, "354 End data with <CR><LF>.<CR><LF>\r\n");
            loop {
                let mut data_line = String::new();
                match reader.read_line(&mut data_line) {
                    Ok(0) | Err(_) => return transcript,
                    Ok(_) => {}
                }
                if data_line == ".\r\n" || data_line == ".\n" {
                    break;
                }
                transcript.data.push_str(&data_line);
            }
            reply(&mut writer, "250 2.0.0 OK queued\r\n");
        } else if upper.starts_with("QUIT") {
            transcript.quit = true;
            reply(&mut writer, "221 2.0.0 Bye\r\n");
            break;
        } else if upper.starts_with("RSET") || upper.starts_with("NOOP") {
            reply(&mut writer, "250 2.0.0 OK\r\n");
        } else {
            reply(&mut writer, "502 5.5.2 Command not implemented\r\n");
        }
    }

    transcript
}

fn reply(writer: &mut TcpStream, text: &str) {
    let _ = writer.write_all(text.as_bytes());
    let _ = writer.flush();
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
