// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::{
    io::{self, BufRead, BufReader, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use robot_protocol::Reply;

use crate::transcript::{Exchange, Transcript};

/// Blocking line client for robotd. Every sent line waits for its reply.
pub struct RobotClient {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    transcript: Transcript,
}

impl RobotClient {
    pub fn connect(addr: impl ToSocketAddrs, read_timeout: Option<Duration>) -> io::Result<Self> {
        let writer = TcpStream::connect(addr)?;
        writer.set_read_timeout(read_timeout)?;
        let reader = BufReader::new(writer.try_clone()?);
        Ok(Self {
            writer,
            reader,
            transcript: Transcript::default(),
        })
    }

    pub fn send(&mut self, line: &str) -> io::Result<Reply> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;

        let mut raw = String::new();
        if self.reader.read_line(&mut raw)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by robotd",
            ));
        }
        let reply = raw
            .parse::<Reply>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.transcript.exchanges.push(Exchange {
            request: line.to_string(),
            reply: reply.to_string(),
            ok: reply.is_ok(),
        });
        Ok(reply)
    }

    /// True once robotd has closed its side of the connection.
    pub fn is_closed_by_server(&mut self) -> io::Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
