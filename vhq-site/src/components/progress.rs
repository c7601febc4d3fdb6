use yew::prelude::*;

use vhq_client::view::ProgressView;

#[derive(Properties, PartialEq)]
pub struct ProgressPanelProps {
    pub title: AttrValue,
    pub progress: ProgressView,
}

#[function_component(ProgressPanel)]
pub fn progress_panel(ProgressPanelProps { title, progress }: &ProgressPanelProps) -> Html {
    html! {
        <div class="section progress-section">
            <h2>{ title }</h2>
            <div class="progress-bar-container">
                <div class="progress-bar" style={format!("width: {:.0}%;", progress.percent)}></div>
            </div>
            <div class="progress-info">
                <span class="progress-percentage">{ progress.label() }</span>
                <span class="progress-status">{ &progress.status }</span>
                if let Some(eta) = &progress.eta {
                    <span class="progress-eta">{ format!("ETA {eta}") }</span>
                }
            </div>
            if let Some(metrics) = &progress.metrics {
                <div class="metrics">
                    <div class="metric">
                        <span class="label">{ "Neurons active" }</span>
                        <span class="value">{ metrics.neurons_active.clone().unwrap_or_default() }</span>
                    </div>
                    <div class="metric">
                        <span class="label">{ "GPU" }</span>
                        <span class="value">{ metrics.gpu_utilization.clone().unwrap_or_default() }</span>
                    </div>
                    <div class="metric">
                        <span class="label">{ "Frames" }</span>
                        <span class="value">{ metrics.frames_processed.map(|f| f.to_string()).unwrap_or_default() }</span>
                    </div>
                </div>
            }
        </div>
    }
}
