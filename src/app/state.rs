use super::{Component, ComponentState, ShutterlinkOrchestrator};
use tracing::debug;

impl ShutterlinkOrchestrator {
    /// Record a lifecycle change and return the state it replaced
    pub(super) async fn set_component_state(
        &self,
        component: Component,
        state: ComponentState,
    ) -> Option<ComponentState> {
        let previous = self.component_states.lock().await.insert(component, state);
        match previous {
            Some(from) if from == state => {}
            Some(from) => debug!("{}: {:?} -> {:?}", component, from, state),
            None => debug!("{}: {:?}", component, state),
        }
        previous
    }

    /// `None` until the component has been started once
    pub async fn component_state(&self, component: Component) -> Option<ComponentState> {
        self.component_states.lock().await.get(&component).copied()
    }
}
