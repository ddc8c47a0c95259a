// ==========================================
// SignalScanner - 信号扫描服务
// ==========================================
// 生命周期: start 启动周期任务（进程内单例），stop 停止任务；
//           会话关闭由应用层在 stop 之后执行。
// 每个 tick: 确认连接（未连上则本周期跳过，不是错误）→
//           按表顺序读取全部点位 → 交给分发器。
// 单个点位读取失败记录日志后继续扫描剩余点位。
// ==========================================

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::plc::client::PlcClient;
use crate::signal::dispatcher::SignalDispatcher;
use crate::signal::table::PlcSignal;

pub struct SignalScanner {
    plc: Arc<dyn PlcClient>,
    dispatcher: Arc<SignalDispatcher>,
    period: Duration,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SignalScanner {
    /// 创建新的信号扫描服务（未启动）
    pub fn new(
        plc: Arc<dyn PlcClient>,
        dispatcher: Arc<SignalDispatcher>,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            plc,
            dispatcher,
            period,
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    /// 启动周期扫描任务（重复调用无效果）
    pub fn start(&self) {
        let mut handle_guard = match self.handle.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("扫描任务句柄锁获取失败: {}", e);
                return;
            }
        };
        if handle_guard.is_some() {
            return;
        }

        // 支持 stop 之后再次 start
        self.shutdown_tx.send_replace(false);

        let plc = self.plc.clone();
        let dispatcher = self.dispatcher.clone();
        let period = self.period;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        Self::scan_once(&plc, &dispatcher);
                    }
                }
            }
        });

        *handle_guard = Some(handle);
        info!(
            "PLC 信号监视已启动。(M120~M135, M140~M141, 周期 {:?})",
            self.period
        );
    }

    /// 停止周期扫描任务并等待退出
    pub async fn stop(&self) {
        let handle = {
            let mut handle_guard = match self.handle.lock() {
                Ok(guard) => guard,
                Err(e) => {
                    error!("扫描任务句柄锁获取失败: {}", e);
                    return;
                }
            };
            handle_guard.take()
        };

        let Some(handle) = handle else {
            return;
        };

        let _ = self.shutdown_tx.send(true);
        if let Err(e) = handle.await {
            warn!("扫描任务退出异常: {}", e);
        }
        info!("PLC 信号监视已停止。");
    }

    /// 执行一个扫描周期
    ///
    /// 未连接时整个周期跳过（下个周期重试）；
    /// 单个点位读取失败不影响剩余点位。
    pub fn tick(&self) {
        Self::scan_once(&self.plc, &self.dispatcher);
    }

    fn scan_once(plc: &Arc<dyn PlcClient>, dispatcher: &SignalDispatcher) {
        if !plc.ensure_connected() {
            return;
        }

        for signal in PlcSignal::SCAN_LIST {
            match plc.read_device(signal.point()) {
                Ok(value) => dispatcher.dispatch(signal, value),
                Err(e) => {
                    error!(
                        "PLC 点位读取错误。device={}, err={}",
                        signal.point(),
                        e
                    );
                }
            }
        }
    }
}
