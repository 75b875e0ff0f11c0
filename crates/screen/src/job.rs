use crate::pipeline::Screener;
use crate::report::{ERROR_TITLE, REPORT_TITLE, render_error};
use kabu_core::notify::port::Notifier;
use std::error::Error;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// 一次定时运行的最终状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    // 产出了报告（含无结果、无数据两种终态）
    Completed,
    // 流水线故障，已尝试上报错误
    Failed,
}

impl JobStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            JobStatus::Completed => 0,
            JobStatus::Failed => 1,
        }
    }
}

impl From<JobStatus> for ExitCode {
    fn from(status: JobStatus) -> Self {
        ExitCode::from(status.exit_code())
    }
}

/// # Summary
/// 运行一次筛选并投递结果，是整个流水线唯一的故障汇集点。
///
/// # Logic
/// 1. 执行 `Screener::run`。
/// 2. 成功时渲染报告并以 `REPORT_TITLE` 投递，返回 `Completed`。
/// 3. 失败时渲染错误报告并以 `ERROR_TITLE` 投递，返回 `Failed`。
/// 4. 投递失败只记录告警，不影响返回状态。
///
/// # Arguments
/// * `screener`: 已装配的流水线。
/// * `notifier`: 通知端。
///
/// # Returns
/// 本次运行的状态。
pub async fn run_job(screener: &Screener, notifier: &dyn Notifier) -> JobStatus {
    match screener.run().await {
        Ok(outcome) => {
            let report = screener.formatter().render(&outcome);
            deliver(notifier, REPORT_TITLE, &report).await;
            JobStatus::Completed
        }
        Err(e) => report_failure(notifier, &e).await,
    }
}

/// # Summary
/// 将流水线之外的启动故障（如数据湖客户端构建失败）送入同一错误汇集路径。
pub async fn report_failure(notifier: &dyn Notifier, failure: &dyn Error) -> JobStatus {
    error!("Screening failed: {}", failure);
    deliver(notifier, ERROR_TITLE, &render_error(failure)).await;
    JobStatus::Failed
}

async fn deliver(notifier: &dyn Notifier, subject: &str, content: &str) {
    match notifier.notify(subject, content).await {
        Ok(()) => info!("Notification delivered: {}", subject),
        Err(e) => warn!("Notification delivery failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(JobStatus::Completed.exit_code(), 0);
        assert_eq!(JobStatus::Failed.exit_code(), 1);
    }
}
