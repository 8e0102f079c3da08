//! 连接中枢
//!
//! 单一控制循环独占持有在线连接集合，所有成员变更与广播都以
//! 消息形式进入收件箱，严格按到达顺序处理。这给出成员变更与
//! 发布负载的全序，是中枢的关键正确性性质。
//!
//! 广播在同一个循环轮次内逐个连接同步 await 发送：某个对端的
//! 出站队列满时，会阻塞对其后所有连接的投递以及全部后续操作。
//! 这是文档化的默认行为，测试覆盖了该停滞场景。

use std::collections::HashMap;

use domain::{Envelope, Identity};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 连接标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 一个已注册连接
///
/// 注册后由中枢独占持有；`outbound` 的接收端由该连接的写任务
/// 持有，发送端随连接被移除而释放，写任务据此关闭传输。
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    pub outbound: mpsc::Sender<Envelope>,
}

enum HubCommand {
    Register(Connection),
    Unregister(ConnectionId),
    Broadcast(Envelope),
    Count(oneshot::Sender<usize>),
}

/// 中枢收件箱句柄，可克隆后在各处提交操作
#[derive(Clone)]
pub struct HubHandle {
    inbox: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// 注册连接，使其可以收到此后（而非此前）的所有广播
    pub fn register(&self, connection: Connection) {
        if self.inbox.send(HubCommand::Register(connection)).is_err() {
            warn!("hub control loop is gone, register dropped");
        }
    }

    /// 注销连接；对不存在的连接是无操作，不是错误
    pub fn unregister(&self, id: ConnectionId) {
        if self.inbox.send(HubCommand::Unregister(id)).is_err() {
            warn!("hub control loop is gone, unregister dropped");
        }
    }

    /// 广播信封给执行时刻的全部成员
    pub fn broadcast(&self, envelope: Envelope) {
        if self.inbox.send(HubCommand::Broadcast(envelope)).is_err() {
            warn!("hub control loop is gone, broadcast dropped");
        }
    }

    /// 查询当前在线连接数
    ///
    /// 查询同样经过收件箱，因此返回时序上早于它的操作都已生效。
    pub async fn connection_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        if self.inbox.send(HubCommand::Count(tx)).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// 连接注册表与广播路由的单所有者控制循环
pub struct Hub {
    connections: HashMap<ConnectionId, Connection>,
    inbox: mpsc::UnboundedReceiver<HubCommand>,
}

impl Hub {
    /// 启动中枢控制循环，返回收件箱句柄
    pub fn spawn() -> HubHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Hub {
            connections: HashMap::new(),
            inbox: rx,
        };
        tokio::spawn(hub.run());
        HubHandle { inbox: tx }
    }

    /// 控制循环在进程生命周期内一直运行，没有终止状态；
    /// 所有句柄都被丢弃后循环退出。
    async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            match command {
                HubCommand::Register(connection) => {
                    debug!(connection_id = %connection.id, user_id = %connection.identity.user_id, "connection registered");
                    self.connections.insert(connection.id, connection);
                    info!(online = self.connections.len(), "user joined chat");
                }
                HubCommand::Unregister(id) => {
                    if self.connections.remove(&id).is_some() {
                        info!(online = self.connections.len(), "user left chat");
                    }
                }
                HubCommand::Broadcast(envelope) => {
                    self.broadcast(envelope).await;
                }
                HubCommand::Count(reply) => {
                    let _ = reply.send(self.connections.len());
                }
            }
        }
        debug!("hub control loop stopped");
    }

    /// 向执行时刻的成员快照逐个投递
    ///
    /// 发送失败（写任务已退出）只移除该连接，不影响其余投递；
    /// 发送阻塞（对端队列满）会停滞整个循环，见模块文档。
    async fn broadcast(&mut self, envelope: Envelope) {
        let mut failed = Vec::new();
        for (id, connection) in &self.connections {
            if connection.outbound.send(envelope.clone()).await.is_err() {
                failed.push(*id);
            }
        }
        for id in failed {
            if self.connections.remove(&id).is_some() {
                warn!(connection_id = %id, online = self.connections.len(), "dropped unreachable connection during broadcast");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Envelope, ServerEvent};
    use std::time::Duration;
    use tokio::time::timeout;

    fn test_envelope(id: i64, content: &str) -> Envelope {
        Envelope::serialize(&ServerEvent::NewText {
            message_id: id,
            user_id: "u1".into(),
            username: "alice".into(),
            content: content.into(),
        })
        .unwrap()
    }

    fn test_connection(capacity: usize) -> (Connection, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        let connection = Connection {
            id: ConnectionId::new(),
            identity: Identity::new("u1", "alice"),
            outbound: tx,
        };
        (connection, rx)
    }

    #[tokio::test]
    async fn membership_tracks_register_and_unregister() {
        let hub = Hub::spawn();
        let (a, _rx_a) = test_connection(8);
        let (b, _rx_b) = test_connection(8);
        let a_id = a.id;

        hub.register(a);
        hub.register(b);
        assert_eq!(hub.connection_count().await, 2);

        hub.unregister(a_id);
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_unregister_is_a_noop() {
        let hub = Hub::spawn();
        let (a, _rx_a) = test_connection(8);
        let a_id = a.id;

        hub.register(a);
        hub.unregister(a_id);
        hub.unregister(a_id);
        assert_eq!(hub.connection_count().await, 0);

        // 注销从未注册的连接同样无事发生
        hub.unregister(ConnectionId::new());
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member() {
        let hub = Hub::spawn();
        let (a, mut rx_a) = test_connection(8);
        let (b, mut rx_b) = test_connection(8);

        hub.register(a);
        hub.register(b);
        hub.broadcast(test_envelope(1, "hi"));

        let payload = test_envelope(1, "hi");
        assert_eq!(rx_a.recv().await.unwrap(), payload);
        assert_eq!(rx_b.recv().await.unwrap(), payload);
    }

    #[tokio::test]
    async fn late_registration_misses_earlier_broadcasts() {
        let hub = Hub::spawn();
        let (a, mut rx_a) = test_connection(8);
        let (b, mut rx_b) = test_connection(8);

        hub.register(a);
        hub.broadcast(test_envelope(1, "first"));
        hub.register(b);
        hub.broadcast(test_envelope(2, "second"));

        assert_eq!(rx_a.recv().await.unwrap(), test_envelope(1, "first"));
        assert_eq!(rx_a.recv().await.unwrap(), test_envelope(2, "second"));
        // B 只能看到注册之后的广播
        assert_eq!(rx_b.recv().await.unwrap(), test_envelope(2, "second"));
        assert!(timeout(Duration::from_millis(50), rx_b.recv()).await.is_err());
    }

    #[tokio::test]
    async fn failed_peer_is_dropped_without_affecting_others() {
        let hub = Hub::spawn();
        let (a, mut rx_a) = test_connection(8);
        let (b, rx_b) = test_connection(8);

        hub.register(a);
        hub.register(b);
        assert_eq!(hub.connection_count().await, 2);

        // B 的写任务消失：接收端被丢弃
        drop(rx_b);
        hub.broadcast(test_envelope(1, "hi"));

        assert_eq!(rx_a.recv().await.unwrap(), test_envelope(1, "hi"));
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn slow_peer_stalls_the_control_loop() {
        let hub = Hub::spawn();
        let (a, mut rx_a) = test_connection(1);

        hub.register(a);
        // 第一条填满出站队列，第二条在循环内阻塞
        hub.broadcast(test_envelope(1, "one"));
        hub.broadcast(test_envelope(2, "two"));

        // 循环停滞，排在后面的查询得不到处理
        assert!(
            timeout(Duration::from_millis(100), hub.connection_count())
                .await
                .is_err()
        );

        // 对端腾出队列空间后循环继续
        assert_eq!(rx_a.recv().await.unwrap(), test_envelope(1, "one"));
        assert_eq!(rx_a.recv().await.unwrap(), test_envelope(2, "two"));
        assert_eq!(hub.connection_count().await, 1);
    }
}
