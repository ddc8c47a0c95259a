// ==========================================
// 装配产线 MES 服务 - PLC 客户端契约
// ==========================================
// 点位编码约定: 首字母区分位/字（M = 位，D = 字），后接数字编号；
// 位点位以 0/非 0 表示布尔值，读写值统一为 i32。
// ==========================================

use crate::plc::error::PlcResult;

/// PLC 客户端契约
///
/// 扫描任务与订单接入路径共享同一个客户端实例；
/// 实现必须在内部对设备访问串行化。
pub trait PlcClient: Send + Sync {
    /// 确认连接；未连接时尝试重连
    ///
    /// 返回 false 表示“尚未连上”，属于正常状态（下个周期重试），
    /// 不作为错误向上传播。
    fn ensure_connected(&self) -> bool;

    /// 读取点位值
    fn read_device(&self, device: &str) -> PlcResult<i32>;

    /// 写入点位值
    fn write_device(&self, device: &str, value: i32) -> PlcResult<()>;

    /// 关闭会话（进程停止时调用）
    fn close(&self);
}
