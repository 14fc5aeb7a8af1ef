use super::*;
use std::sync::{Arc, Mutex};
use glam::Mat4;
use crate::device::mock_device::MockCommandList;
use crate::device::{Rect2D, Viewport};

struct Recording {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl PostEffect for Recording {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, _cmd: &mut dyn CommandList, _camera: &Camera) -> Result<()> {
        self.log.lock().unwrap().push(self.name.clone());
        if self.fail {
            return Err(Error::BackendError("shader missing".to_string()));
        }
        Ok(())
    }
}

fn effect(name: &str, log: &Arc<Mutex<Vec<String>>>, fail: bool) -> Recording {
    Recording { name: name.to_string(), log: Arc::clone(log), fail }
}

fn camera() -> Camera {
    let viewport = Viewport::from_rect(Rect2D { x: 0, y: 0, width: 64, height: 64 });
    Camera::new(Mat4::IDENTITY, Mat4::IDENTITY, viewport, 0.1, 10.0)
}

#[test]
fn test_effects_run_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut chain = PostProcessChain::new();
    chain.push(effect("bloom", &log, false));
    chain.push(effect("tonemap", &log, false));

    let applied = chain.run(&mut MockCommandList::new(), &camera()).unwrap();

    assert_eq!(applied, 2);
    assert_eq!(*log.lock().unwrap(), vec!["bloom", "tonemap"]);
    assert_eq!(chain.names(), vec!["bloom", "tonemap"]);
}

#[test]
fn test_failure_is_wrapped_with_effect_name() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut chain = PostProcessChain::new();
    chain.push(effect("bloom", &log, false));
    chain.push(effect("dof", &log, true));
    chain.push(effect("tonemap", &log, false));

    let err = chain.run(&mut MockCommandList::new(), &camera()).unwrap_err();

    assert_eq!(err, Error::PostProcessFailed {
        effect: "dof".to_string(),
        message: "Backend error: shader missing".to_string(),
    });
    assert_eq!(*log.lock().unwrap(), vec!["bloom", "dof"]);
}

#[test]
fn test_empty_chain_and_remove() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut chain = PostProcessChain::new();
    assert!(chain.is_empty());
    assert_eq!(chain.run(&mut MockCommandList::new(), &camera()).unwrap(), 0);

    chain.push(effect("fxaa", &log, false));
    assert!(chain.remove("fxaa"));
    assert!(!chain.remove("fxaa"));
    assert_eq!(chain.len(), 0);
}
