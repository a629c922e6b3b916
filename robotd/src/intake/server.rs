// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use anyhow::Context;
use async_channel::{Receiver, Sender};
use async_io::{Async, Timer};
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, Either};
use futures::task::LocalSpawnExt;
use futures::{pin_mut, select, FutureExt};
use log::{debug, error, info, warn};

use crate::intake::connection::serve_connection;
use crate::intake::shutdown::ShutdownTrigger;
use crate::mailbox::Mailbox;

/// TCP front end. All connections are served as tasks on the thread that
/// calls [`Server::run`].
#[derive(Debug)]
pub struct Server {
    listener: Async<TcpListener>,
    mailbox: Mailbox,
    trigger: ShutdownTrigger,
    stopped: Receiver<()>,
    drain_timeout: Duration,
}

impl Server {
    pub fn bind(addr: SocketAddr, mailbox: Mailbox, drain_timeout: Duration) -> anyhow::Result<Self> {
        let listener = Async::<TcpListener>::bind(addr)
            .with_context(|| format!("could not start the server on {addr}"))?;
        let (trigger, stopped) = ShutdownTrigger::new(mailbox.clone());
        Ok(Self {
            listener,
            mailbox,
            trigger,
            stopped,
            drain_timeout,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.get_ref().local_addr()
    }

    /// Handle that shuts the whole hub down from outside the server.
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Accepts clients until shutdown is triggered, then gives the open
    /// connections `drain_timeout` to finish before dropping them.
    pub fn run(self) {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let (open, all_closed) = async_channel::bounded::<()>(1);

        pool.run_until(self.accept_loop(&spawner, open));

        debug!("Draining open connections");
        if pool.run_until(wait_closed(all_closed, self.drain_timeout)) {
            debug!("All connections closed");
        } else {
            warn!(
                "Connections still open after {:?}, dropping them",
                self.drain_timeout
            );
        }
        // dropping the pool drops the remaining connection tasks
        info!("Server stopped");
    }

    async fn accept_loop(&self, spawner: &LocalSpawner, open: Sender<()>) {
        match self.local_addr() {
            Ok(addr) => info!("Server listening on {addr}"),
            Err(err) => warn!("Server listening on unknown address: {err}"),
        }

        loop {
            let accepted = {
                let accept = self.listener.accept().fuse();
                let stop = self.stopped.recv().fuse();
                pin_mut!(accept, stop);
                select! {
                    accepted = accept => Some(accepted),
                    _ = stop => None,
                }
            };
            let Some(accepted) = accepted else {
                break;
            };

            match accepted {
                Ok((stream, peer)) => {
                    if !self.mailbox.is_active() {
                        debug!("Refusing {peer}, shutdown in progress");
                        break;
                    }
                    info!("New client connected: {peer}");
                    let task = serve_connection(
                        stream,
                        peer,
                        self.mailbox.clone(),
                        self.trigger.clone(),
                        open.clone(),
                    );
                    if let Err(err) = spawner.spawn_local(task) {
                        error!("Failed to spawn connection task for {peer}: {err}");
                    }
                }
                Err(err) => {
                    if self.mailbox.is_active() {
                        error!("Failed to accept connection: {err}");
                    }
                }
            }
        }
        info!("Server stopped accepting connections");
    }
}

/// Resolves to `true` once every connection dropped its sender, or to `false`
/// when `timeout` runs out first.
async fn wait_closed(all_closed: Receiver<()>, timeout: Duration) -> bool {
    let closed = Box::pin(async move { while all_closed.recv().await.is_ok() {} });
    match future::select(closed, Timer::after(timeout)).await {
        Either::Left(_) => true,
        Either::Right(_) => false,
    }
}
