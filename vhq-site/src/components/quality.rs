use yew::prelude::*;

use vhq_client::view::QualityCard;

#[derive(Properties, PartialEq)]
pub struct QualityCardsProps {
    pub cards: Vec<QualityCard>,
    pub on_select: Callback<String>,
}

#[function_component(QualityCards)]
pub fn quality_cards(QualityCardsProps { cards, on_select }: &QualityCardsProps) -> Html {
    html! {
        <div class="quality-grid">
            {
                cards.iter().map(|card| {
                    let onclick = {
                        let on_select = on_select.clone();
                        let quality = card.option.quality.clone();
                        Callback::from(move |_: MouseEvent| on_select.emit(quality.clone()))
                    };
                    let premium = matches!(card.option.gating, vhq_client::gate::Gating::Premium);
                    html! {
                        <div
                            {onclick}
                            class={classes!("quality-card", premium.then_some("premium"), card.selected.then_some("selected"))}
                        >
                            if let Some(badge) = &card.badge {
                                <div class={if premium { "premium-badge" } else { "ad-badge" }}>{ badge }</div>
                            }
                            <div class="quality-icon">{ &card.option.icon }</div>
                            <div class="quality-label">{ format!("{} {}", card.option.quality, card.option.label) }</div>
                            <div class="quality-details">
                                { &card.details }
                                <br />
                                <small>{ &card.processing }</small>
                            </div>
                        </div>
                    }
                }).collect::<Html>()
            }
        </div>
    }
}
