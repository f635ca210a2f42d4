//! Page script
//!
//! Draws the embedded figure with Plotly and reloads the page on the
//! body's `data-refresh-ms` interval so the rendered file stays current.

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

pub const SCRIPT: &str = r"
function drawChart() {
    const source = document.getElementById('figureData');
    if (!source || typeof Plotly === 'undefined') return;

    let figure;
    try {
        figure = JSON.parse(source.textContent);
    } catch (e) {
        console.error('Invalid figure data:', e);
        return;
    }
    if (!figure) return;

    Plotly.react('priceChart', figure.data, figure.layout, { responsive: true, displayModeBar: false });
}

function scheduleReload() {
    const ms = parseInt(document.body.dataset.refreshMs, 10);
    if (ms > 0) setTimeout(() => location.reload(), ms);
}

document.addEventListener('DOMContentLoaded', () => {
    drawChart();
    scheduleReload();
});
";
