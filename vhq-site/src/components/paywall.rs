use yew::prelude::*;

use vhq_api::api::process_video::post::PremiumOffer;

#[derive(Properties, PartialEq)]
pub struct PaywallProps {
    pub offer: PremiumOffer,
    pub on_close: Callback<MouseEvent>,
}

#[function_component(Paywall)]
pub fn paywall(PaywallProps { offer, on_close }: &PaywallProps) -> Html {
    html! {
        <div class="modal-backdrop">
            <div class="modal premium-offer">
                <button class="modal-close" onclick={on_close.clone()}>{ "\u{00D7}" }</button>
                <h2><i class="fas fa-crown"></i>{ " Go Premium" }</h2>
                if let Some(price) = &offer.price {
                    <p class="price">{ price }</p>
                }
                if let Some(trial) = &offer.trial {
                    <p class="trial">{ trial }</p>
                }
                <ul class="benefits">
                    { offer.benefits.iter().map(|b| html! { <li>{ b }</li> }).collect::<Html>() }
                </ul>
            </div>
        </div>
    }
}
