use yew::prelude::*;

use vhq_client::view::AdView;

#[derive(Properties, PartialEq)]
pub struct AdModalProps {
    pub ad: AdView,
    pub on_complete: Callback<MouseEvent>,
    pub on_close: Callback<MouseEvent>,
}

/// Countdown of the ad unlocking a quality. Closing it abandons the ad.
#[function_component(AdModal)]
pub fn ad_modal(
    AdModalProps {
        ad,
        on_complete,
        on_close,
    }: &AdModalProps,
) -> Html {
    html! {
        <div class="modal-backdrop">
            <div class="modal ad-modal">
                <button class="modal-close" onclick={on_close.clone()}>{ "\u{00D7}" }</button>
                <h2>{ format!("Unlocking {}", ad.quality) }</h2>
                <div class="ad-content">
                    <p>{ "Your video will be enhanced right after this short ad." }</p>
                    <div class="ad-timer">{ &ad.timer }</div>
                </div>
                if ad.can_complete {
                    <button class="btn-primary" disabled={ad.completing} onclick={on_complete.clone()}>
                        { if ad.completing { "Unlocking..." } else { "Continue" } }
                    </button>
                }
            </div>
        </div>
    }
}
