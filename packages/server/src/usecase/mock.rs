//! UseCase テスト用の手書きモック

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{DispatchError, DispatchEvent, MessageDispatcher, ReadNotice, ReceiptNotifier};

/// 投入されたイベントを記録するだけの Dispatcher
#[derive(Default)]
pub struct RecordingDispatcher {
    events: Mutex<Vec<DispatchEvent>>,
}

impl RecordingDispatcher {
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageDispatcher for RecordingDispatcher {
    async fn submit(&self, event: DispatchEvent) -> Result<(), DispatchError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// 停止済みの Dispatcher
pub struct ClosedDispatcher;

#[async_trait]
impl MessageDispatcher for ClosedDispatcher {
    async fn submit(&self, event: DispatchEvent) -> Result<(), DispatchError> {
        Err(DispatchError::Closed(event.room_id()))
    }
}

/// 送られた既読通知を記録する Notifier
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<ReadNotice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<ReadNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl ReceiptNotifier for RecordingNotifier {
    fn notify_read(&self, notice: ReadNotice) -> usize {
        self.notices.lock().unwrap().push(notice);
        1
    }
}
